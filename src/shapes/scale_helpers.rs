//! Helpers for reasoning about per-axis shape scale.

use crate::math::{Matrix3, Quaternion, Vector3};

/// Components with an absolute value below this are considered zero
pub const MIN_SCALE: f32 = 1.0e-6;

/// Squared tolerance used when comparing scale components
pub const SCALE_TOLERANCE_SQ: f32 = 1.0e-8;

/// Returns true if all components of the scale are equal
#[inline]
pub fn is_uniform_scale(scale: Vector3) -> bool {
    scale.swizzle_yzx().is_close(&scale, SCALE_TOLERANCE_SQ)
}

/// Returns true if any component of the scale is near zero
#[inline]
pub fn is_zero_scale(scale: Vector3) -> bool {
    scale.abs().reduce_min() < MIN_SCALE
}

/// Expresses the scale in the frame of `rotation`, as the matrix `R^T * S * R`
fn rotated_scale_matrix(rotation: &Quaternion, scale: Vector3) -> Matrix3 {
    let r = rotation.to_rotation_matrix();
    r.transpose()
        .multiply_matrix(&Matrix3::from_diagonal(scale))
        .multiply_matrix(&r)
}

/// Returns true if a scale applied outside `rotation` can be applied inside it
/// without introducing shear.
///
/// A uniform scale can always be rotated.
pub fn can_scale_be_rotated(rotation: &Quaternion, scale: Vector3) -> bool {
    let child = rotated_scale_matrix(rotation, scale);

    for r in 0..3 {
        for c in 0..3 {
            if r != c && child.data[r][c].abs() > MIN_SCALE {
                return false;
            }
        }
    }

    true
}

/// Returns the scale to apply inside `rotation` so that the combined transform
/// matches applying `scale` outside it.
///
/// Only meaningful when [`can_scale_be_rotated`] holds.
pub fn rotate_scale(rotation: &Quaternion, scale: Vector3) -> Vector3 {
    rotated_scale_matrix(rotation, scale).diagonal()
}
