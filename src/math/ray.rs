use crate::math::{Vector3, Matrix4};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Ray representation for intersection tests.
///
/// The direction is not normalized: its length is the length of the ray, so hit
/// fractions lie in `[0, 1]` and `point_at(1.0)` is the end of the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Origin of the ray
    pub origin: Vector3,

    /// Direction and length of the ray
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    #[inline]
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at a given fraction along the ray
    #[inline]
    pub fn point_at(&self, fraction: f32) -> Vector3 {
        self.origin + self.direction * fraction
    }

    /// Transforms the ray by an affine matrix
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        Self {
            origin: matrix.multiply_point(self.origin),
            direction: matrix.multiply_direction(self.direction),
        }
    }

    /// Translates the ray
    #[inline]
    pub fn translated(&self, translation: Vector3) -> Self {
        Self::new(self.origin + translation, self.direction)
    }
}
