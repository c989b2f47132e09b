use nalgebra as na;
use crate::math::{Vector3, Quaternion};
use std::fmt;
use std::ops::{Add, Mul, Sub};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A 3x3 matrix, stored row-major as `data[row][col]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    pub data: [[f32; 3]; 3],
}

/// A 4x4 affine transform, stored row-major as `data[row][col]`, acting on column vectors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix4 {
    pub data: [[f32; 4]; 4],
}

// === Matrix3 Implementation ===

impl Matrix3 {
    /// Creates a new 3x3 matrix from a 2D array
    #[inline]
    pub fn new(data: [[f32; 3]; 3]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::from_diagonal(Vector3::one())
    }

    #[inline]
    pub fn zero() -> Self {
        Self { data: [[0.0; 3]; 3] }
    }

    /// Creates a diagonal matrix
    #[inline]
    pub fn from_diagonal(diagonal: Vector3) -> Self {
        Self {
            data: [
                [diagonal.x, 0.0, 0.0],
                [0.0, diagonal.y, 0.0],
                [0.0, 0.0, diagonal.z],
            ],
        }
    }

    /// Builds a matrix from three column vectors
    #[inline]
    pub fn from_columns(c0: Vector3, c1: Vector3, c2: Vector3) -> Self {
        Self {
            data: [
                [c0.x, c1.x, c2.x],
                [c0.y, c1.y, c2.y],
                [c0.z, c1.z, c2.z],
            ],
        }
    }

    /// Returns column `index`
    #[inline]
    pub fn column(&self, index: usize) -> Vector3 {
        Vector3::new(self.data[0][index], self.data[1][index], self.data[2][index])
    }

    /// Returns the diagonal of the matrix
    #[inline]
    pub fn diagonal(&self) -> Vector3 {
        Vector3::new(self.data[0][0], self.data[1][1], self.data[2][2])
    }

    /// Returns the determinant of the matrix
    pub fn determinant(&self) -> f32 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        a * (e * i - f * h) -
        b * (d * i - f * g) +
        c * (d * h - e * g)
    }

    /// Returns the transpose of the matrix
    #[inline]
    pub fn transpose(&self) -> Self {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Self {
            data: [
                [a, d, g],
                [b, e, h],
                [c, f, i],
            ],
        }
    }

    /// Multiplies the matrix by a vector
    #[inline]
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Vector3::new(
            a * v.x + b * v.y + c * v.z,
            d * v.x + e * v.y + f * v.z,
            g * v.x + h * v.y + i * v.z,
        )
    }

    /// Multiplies the matrix by another matrix (`other` is applied first)
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = Self::zero();

        for i in 0..3 {
            for j in 0..3 {
                result.data[i][j] = (0..3).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }

        result
    }

    /// Returns true if every element differs from `other` by at most `tolerance`
    pub fn is_close(&self, other: &Self, tolerance: f32) -> bool {
        self.data.iter().flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Convert to nalgebra Matrix3
    #[inline]
    pub fn to_nalgebra(&self) -> na::Matrix3<f32> {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        na::Matrix3::new(
            a, b, c,
            d, e, f,
            g, h, i,
        )
    }

    /// Convert from nalgebra Matrix3
    #[inline]
    pub fn from_nalgebra(m: &na::Matrix3<f32>) -> Self {
        Self {
            data: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut result = self;
        for (r, row) in result.data.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value += other.data[r][c];
            }
        }
        result
    }
}

impl Sub for Matrix3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other * -1.0
    }
}

impl Mul<f32> for Matrix3 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        let mut result = self;
        for value in result.data.iter_mut().flatten() {
            *value *= scalar;
        }
        result
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ {}, {}, {} ]", self.data[0][0], self.data[0][1], self.data[0][2])?;
        writeln!(f, "[ {}, {}, {} ]", self.data[1][0], self.data[1][1], self.data[1][2])?;
        write!(f, "[ {}, {}, {} ]", self.data[2][0], self.data[2][1], self.data[2][2])
    }
}

// === Matrix4 Implementation ===

impl Matrix4 {
    /// Creates a new 4x4 matrix from a 2D array
    #[inline]
    pub fn new(data: [[f32; 4]; 4]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::from_rotation_translation(Matrix3::identity(), Vector3::zero())
    }

    /// Creates a translation matrix
    #[inline]
    pub fn from_translation(translation: Vector3) -> Self {
        Self::from_rotation_translation(Matrix3::identity(), translation)
    }

    /// Creates a pure rotation matrix from a unit quaternion
    #[inline]
    pub fn from_rotation(rotation: Quaternion) -> Self {
        Self::from_rotation_translation(rotation.to_rotation_matrix(), Vector3::zero())
    }

    /// Creates a rotation followed by a translation
    #[inline]
    pub fn from_quaternion_translation(rotation: Quaternion, translation: Vector3) -> Self {
        Self::from_rotation_translation(rotation.to_rotation_matrix(), translation)
    }

    /// Creates a 4x4 matrix from a 3x3 rotation matrix and a translation
    #[inline]
    pub fn from_rotation_translation(rotation: Matrix3, translation: Vector3) -> Self {
        Self {
            data: [
                [rotation.data[0][0], rotation.data[0][1], rotation.data[0][2], translation.x],
                [rotation.data[1][0], rotation.data[1][1], rotation.data[1][2], translation.y],
                [rotation.data[2][0], rotation.data[2][1], rotation.data[2][2], translation.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Multiplies the matrix by a point (w = 1)
    #[inline]
    pub fn multiply_point(&self, v: Vector3) -> Vector3 {
        self.multiply_direction(v) + self.translation()
    }

    /// Multiplies the upper 3x3 part of the matrix by a direction (w = 0)
    #[inline]
    pub fn multiply_direction(&self, v: Vector3) -> Vector3 {
        let m = &self.data;
        Vector3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Multiplies the transpose of the upper 3x3 part by a direction
    #[inline]
    pub fn multiply_direction_transposed(&self, v: Vector3) -> Vector3 {
        let m = &self.data;
        Vector3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }

    /// Multiplies the matrix by another matrix (`other` is applied first)
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = Self::new([[0.0; 4]; 4]);

        for i in 0..4 {
            for j in 0..4 {
                result.data[i][j] = (0..4).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }

        result
    }

    /// Returns the transposed rotation part with the translation cleared
    #[inline]
    pub fn transposed_3x3(&self) -> Self {
        Self::from_rotation_translation(self.to_matrix3().transpose(), Vector3::zero())
    }

    /// Inverse of a matrix that only contains rotation and translation
    #[inline]
    pub fn inversed_rotation_translation(&self) -> Self {
        let rotation = self.to_matrix3().transpose();
        let translation = -rotation.multiply_vector(self.translation());
        Self::from_rotation_translation(rotation, translation)
    }

    /// Returns `self * Scale(scale)`, scaling the columns of the 3x3 part
    #[inline]
    pub fn pre_scaled(&self, scale: Vector3) -> Self {
        let mut result = *self;
        for row in result.data.iter_mut().take(3) {
            row[0] *= scale.x;
            row[1] *= scale.y;
            row[2] *= scale.z;
        }
        result
    }

    /// Returns column `index` of the 3x3 part
    #[inline]
    pub fn axis(&self, index: usize) -> Vector3 {
        Vector3::new(self.data[0][index], self.data[1][index], self.data[2][index])
    }

    /// Extract the upper-left 3x3 matrix (rotation part)
    #[inline]
    pub fn to_matrix3(&self) -> Matrix3 {
        Matrix3 {
            data: [
                [self.data[0][0], self.data[0][1], self.data[0][2]],
                [self.data[1][0], self.data[1][1], self.data[1][2]],
                [self.data[2][0], self.data[2][1], self.data[2][2]],
            ],
        }
    }

    /// Extract the translation part of the matrix
    #[inline]
    pub fn translation(&self) -> Vector3 {
        Vector3::new(self.data[0][3], self.data[1][3], self.data[2][3])
    }

    /// Replaces the translation part of the matrix
    #[inline]
    pub fn set_translation(&mut self, translation: Vector3) {
        self.data[0][3] = translation.x;
        self.data[1][3] = translation.y;
        self.data[2][3] = translation.z;
    }

    /// Returns true if every element differs from `other` by at most `tolerance`
    pub fn is_close(&self, other: &Self, tolerance: f32) -> bool {
        self.data.iter().flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Convert to nalgebra Matrix4
    #[inline]
    pub fn to_nalgebra(&self) -> na::Matrix4<f32> {
        let m = &self.data;

        na::Matrix4::new(
            m[0][0], m[0][1], m[0][2], m[0][3],
            m[1][0], m[1][1], m[1][2], m[1][3],
            m[2][0], m[2][1], m[2][2], m[2][3],
            m[3][0], m[3][1], m[3][2], m[3][3],
        )
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.data[..3] {
            writeln!(f, "[ {}, {}, {}, {} ]", row[0], row[1], row[2], row[3])?;
        }
        write!(f, "[ {}, {}, {}, {} ]", self.data[3][0], self.data[3][1], self.data[3][2], self.data[3][3])
    }
}
