use crate::math::{Vector3, Matrix4, Quaternion};
use crate::math::rotation::Rotation;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A transformation in 3D space (scale, then rotation, then translation)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Position in 3D space
    pub position: Vector3,

    /// Rotation as a quaternion
    pub rotation: Quaternion,

    /// Scale in each axis
    pub scale: Vector3,
}

impl Transform {
    /// Creates a new transform with the given position, rotation, and scale
    #[inline]
    pub fn new(position: Vector3, rotation: Quaternion, scale: Vector3) -> Self {
        Self { position, rotation, scale }
    }

    /// Creates a new identity transform (no translation, no rotation, unit scale)
    #[inline]
    pub fn identity() -> Self {
        Self::new(Vector3::zero(), Quaternion::identity(), Vector3::one())
    }

    /// Decomposes an affine matrix into translation, rotation and scale.
    ///
    /// Shear cannot be represented and is dropped.
    pub fn from_matrix(matrix: &Matrix4) -> Self {
        let position = matrix.translation();
        let mut rot_mat = matrix.to_matrix3();

        // Column lengths are the scale factors
        let mut scale = Vector3::new(
            rot_mat.column(0).length(),
            rot_mat.column(1).length(),
            rot_mat.column(2).length(),
        );

        // A mirroring matrix gets a negative scale on the first axis
        if rot_mat.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        for (col, s) in [scale.x, scale.y, scale.z].into_iter().enumerate() {
            if s.abs() > crate::math::EPSILON {
                for row in 0..3 {
                    rot_mat.data[row][col] /= s;
                }
            }
        }

        let rotation = Quaternion::from_rotation_matrix(&rot_mat).normalize();

        Self { position, rotation, scale }
    }

    /// Converts the transform to a 4x4 matrix
    pub fn to_matrix(&self) -> Matrix4 {
        Matrix4::from_quaternion_translation(self.rotation, self.position).pre_scaled(self.scale)
    }

    /// Transforms a point by this transform
    #[inline]
    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        self.rotation.rotate_vector(point.component_mul(&self.scale)) + self.position
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
