use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A plane `normal . p + constant = 0`.
///
/// Points with a negative signed distance are below the plane, which is the
/// submerged side for buoyancy queries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// Normal of the plane, pointing out of the fluid
    pub normal: Vector3,

    /// Negative distance of the plane from the origin along the normal
    pub constant: f32,
}

impl Plane {
    /// Creates a new plane, normalizing the normal
    pub fn new(normal: Vector3, constant: f32) -> Self {
        Self {
            normal: normal.normalize(),
            constant,
        }
    }

    /// Creates a plane from a point on the plane and its normal
    pub fn from_point_and_normal(point: Vector3, normal: Vector3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -normal.dot(&point),
        }
    }

    /// Creates a horizontal plane (normal +Y) at the specified height
    pub fn horizontal(height: f32) -> Self {
        Self::new(Vector3::unit_y(), -height)
    }

    /// Returns the signed distance from a point to the plane
    #[inline]
    pub fn signed_distance(&self, point: Vector3) -> f32 {
        self.normal.dot(&point) + self.constant
    }

    /// Returns whether a point is below the plane
    #[inline]
    pub fn is_point_submerged(&self, point: Vector3) -> bool {
        self.signed_distance(point) < 0.0
    }
}
