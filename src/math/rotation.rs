use crate::math::{Vector3, Matrix3};
use approx::{AbsDiffEq, RelativeEq};
use std::fmt;
use std::ops::{Mul, MulAssign};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Default squared tolerance used by [`Quaternion::is_close`]
pub const QUATERNION_CLOSE_TOLERANCE_SQ: f32 = 1.0e-12;

/// Quaternion for representing rotations in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Quaternion {
    /// Real component
    pub w: f32,

    /// First imaginary component
    pub x: f32,

    /// Second imaginary component
    pub y: f32,

    /// Third imaginary component
    pub z: f32,
}

/// Rotation trait for rotation representations
pub trait Rotation {
    /// Rotate a vector by this rotation
    fn rotate_vector(&self, v: Vector3) -> Vector3;

    /// Get the angle in radians of this rotation
    fn angle(&self) -> f32;

    /// Get the axis of this rotation
    fn axis(&self) -> Vector3;
}

impl Quaternion {
    /// Creates a new quaternion
    #[inline]
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Creates an identity quaternion (no rotation)
    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Creates a quaternion from an axis-angle representation
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let half_angle = angle * 0.5;
        let s = half_angle.sin();
        let c = half_angle.cos();

        let axis = axis.normalize();

        Self {
            w: c,
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
        }
    }

    /// Creates a quaternion from a rotation matrix
    pub fn from_rotation_matrix(m: &Matrix3) -> Self {
        let trace = m.data[0][0] + m.data[1][1] + m.data[2][2];

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self {
                w: 0.25 / s,
                x: (m.data[2][1] - m.data[1][2]) * s,
                y: (m.data[0][2] - m.data[2][0]) * s,
                z: (m.data[1][0] - m.data[0][1]) * s,
            }
        } else if m.data[0][0] > m.data[1][1] && m.data[0][0] > m.data[2][2] {
            let s = 2.0 * (1.0 + m.data[0][0] - m.data[1][1] - m.data[2][2]).sqrt();
            Self {
                w: (m.data[2][1] - m.data[1][2]) / s,
                x: 0.25 * s,
                y: (m.data[0][1] + m.data[1][0]) / s,
                z: (m.data[0][2] + m.data[2][0]) / s,
            }
        } else if m.data[1][1] > m.data[2][2] {
            let s = 2.0 * (1.0 + m.data[1][1] - m.data[0][0] - m.data[2][2]).sqrt();
            Self {
                w: (m.data[0][2] - m.data[2][0]) / s,
                x: (m.data[0][1] + m.data[1][0]) / s,
                y: 0.25 * s,
                z: (m.data[1][2] + m.data[2][1]) / s,
            }
        } else {
            let s = 2.0 * (1.0 + m.data[2][2] - m.data[0][0] - m.data[1][1]).sqrt();
            Self {
                w: (m.data[1][0] - m.data[0][1]) / s,
                x: (m.data[0][2] + m.data[2][0]) / s,
                y: (m.data[1][2] + m.data[2][1]) / s,
                z: 0.25 * s,
            }
        }
    }

    /// Converts the quaternion to a rotation matrix
    pub fn to_rotation_matrix(&self) -> Matrix3 {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);

        let xx = x * x;
        let xy = x * y;
        let xz = x * z;
        let xw = x * w;

        let yy = y * y;
        let yz = y * z;
        let yw = y * w;

        let zz = z * z;
        let zw = z * w;

        Matrix3 {
            data: [
                [1.0 - 2.0 * (yy + zz), 2.0 * (xy - zw), 2.0 * (xz + yw)],
                [2.0 * (xy + zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - xw)],
                [2.0 * (xz - yw), 2.0 * (yz + xw), 1.0 - 2.0 * (xx + yy)],
            ],
        }
    }

    /// Returns the conjugate of this quaternion (the inverse rotation for unit quaternions)
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Normalizes this quaternion, falling back to identity when it has no length
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > crate::math::EPSILON {
            Self::new(self.w / len, self.x / len, self.y / len, self.z / len)
        } else {
            Quaternion::identity()
        }
    }

    /// Returns true if the quaternion has unit length within `tolerance`
    #[inline]
    pub fn is_normalized(&self, tolerance: f32) -> bool {
        (self.length_squared() - 1.0).abs() <= tolerance
    }

    /// Returns true if the component-wise squared distance to `other` is at most `max_dist_sq`.
    ///
    /// Note that `q` and `-q` describe the same rotation but are not considered close.
    #[inline]
    pub fn is_close(&self, other: &Self, max_dist_sq: f32) -> bool {
        let d = Self::new(other.w - self.w, other.x - self.x, other.y - self.y, other.z - self.z);
        d.length_squared() <= max_dist_sq
    }

    /// Shorthand for `is_close(&Quaternion::identity(), QUATERNION_CLOSE_TOLERANCE_SQ)`
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.is_close(&Self::identity(), QUATERNION_CLOSE_TOLERANCE_SQ)
    }

    /// Returns the inverse of this quaternion
    #[inline]
    pub fn inverse(&self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > crate::math::EPSILON {
            let inv_len_sq = 1.0 / len_sq;
            Self::new(self.w * inv_len_sq, -self.x * inv_len_sq, -self.y * inv_len_sq, -self.z * inv_len_sq)
        } else {
            Quaternion::identity()
        }
    }

    /// Computes the dot product of two quaternions
    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Convert to nalgebra Quaternion
    #[inline]
    pub fn to_nalgebra(&self) -> nalgebra::Quaternion<f32> {
        nalgebra::Quaternion::new(self.w, self.x, self.y, self.z)
    }

    /// Convert from nalgebra Quaternion
    #[inline]
    pub fn from_nalgebra(q: &nalgebra::Quaternion<f32>) -> Self {
        Self {
            w: q.scalar(),
            x: q.vector()[0],
            y: q.vector()[1],
            z: q.vector()[2],
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation for Quaternion {
    /// Rotates a vector by this quaternion
    fn rotate_vector(&self, v: Vector3) -> Vector3 {
        // q * v * q^-1
        let vec_quat = Quaternion::new(0.0, v.x, v.y, v.z);
        let result = *self * vec_quat * self.conjugate();

        Vector3::new(result.x, result.y, result.z)
    }

    /// Returns the angle in radians of this rotation
    fn angle(&self) -> f32 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// Returns the normalized axis of this rotation
    fn axis(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z).normalize()
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.w, self.x, self.y, self.z)
    }
}

// Quaternion multiplication, `a * b` applies `b` first
impl Mul for Quaternion {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.rotate_vector(rhs)
    }
}

impl MulAssign for Quaternion {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.w.abs_diff_eq(&other.w, epsilon)
            && self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.w.relative_eq(&other.w, epsilon, max_relative)
            && self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}
