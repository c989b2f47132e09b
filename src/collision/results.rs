use crate::collision::CollisionResult;
use crate::math::Vector3;
use crate::shapes::SubShapeId;

/// Hit of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastResult {
    /// Hit position is `origin + fraction * direction`
    pub fraction: f32,

    /// Leaf of the target shape that was hit
    pub sub_shape_id2: SubShapeId,
}

impl Default for RayCastResult {
    fn default() -> Self {
        Self {
            fraction: 1.0 + f32::EPSILON,
            sub_shape_id2: SubShapeId::EMPTY,
        }
    }
}

impl CollisionResult for RayCastResult {
    fn early_out_fraction(&self) -> f32 {
        self.fraction
    }
}

/// A point found inside a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollidePointResult {
    pub sub_shape_id2: SubShapeId,
}

impl CollisionResult for CollidePointResult {
    fn early_out_fraction(&self) -> f32 {
        0.0
    }
}

/// Contact between two shapes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollideShapeResult {
    /// Deepest point of shape 1 (world space)
    pub contact_point_on1: Vector3,

    /// Deepest point of shape 2 (world space)
    pub contact_point_on2: Vector3,

    /// Direction to move shape 2 out of collision (not normalized)
    pub penetration_axis: Vector3,

    /// Penetration depth, negative when the shapes are separated
    pub penetration_depth: f32,

    pub sub_shape_id1: SubShapeId,
    pub sub_shape_id2: SubShapeId,
}

impl CollisionResult for CollideShapeResult {
    fn early_out_fraction(&self) -> f32 {
        -self.penetration_depth
    }
}

/// Time of impact of a shape cast
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeCastResult {
    /// Contact data at the time of impact
    pub contact: CollideShapeResult,

    /// Fraction of the cast direction travelled before impact
    pub fraction: f32,
}

impl CollisionResult for ShapeCastResult {
    fn early_out_fraction(&self) -> f32 {
        // Shapes that start in collision are ordered by depth
        if self.fraction > 0.0 {
            self.fraction
        } else {
            -self.contact.penetration_depth
        }
    }
}
