use crate::math::{Matrix4, Vector3};
use crate::shapes::{Shape, SubShapeId};

/// A shape swept along a direction
#[derive(Debug, Clone, Copy)]
pub struct ShapeCast<'a> {
    /// Shape being cast
    pub shape: &'a dyn Shape,

    /// Local scale of the cast shape
    pub scale: Vector3,

    /// Center of mass transform of the shape at the start of the cast
    pub center_of_mass_start: Matrix4,

    /// Direction and length of the cast
    pub direction: Vector3,
}

impl<'a> ShapeCast<'a> {
    pub fn new(shape: &'a dyn Shape, scale: Vector3, center_of_mass_start: Matrix4, direction: Vector3) -> Self {
        Self {
            shape,
            scale,
            center_of_mass_start,
            direction,
        }
    }

    /// Applies `transform` after the cast's own start transform
    pub fn post_transformed(&self, transform: &Matrix4) -> Self {
        Self {
            shape: self.shape,
            scale: self.scale,
            center_of_mass_start: transform.multiply_matrix(&self.center_of_mass_start),
            direction: transform.multiply_direction(self.direction),
        }
    }
}

/// Decides which (pairs of) shapes take part in a query
pub trait ShapeFilter {
    /// Filter for a single shape
    fn should_collide(&self, _shape: &dyn Shape, _sub_shape_id: SubShapeId) -> bool {
        true
    }

    /// Filter for a pair of shapes
    fn should_collide_pair(
        &self,
        _shape1: &dyn Shape,
        _sub_shape_id1: SubShapeId,
        _shape2: &dyn Shape,
        _sub_shape_id2: SubShapeId,
    ) -> bool {
        true
    }
}

/// Filter that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShapeFilter;

impl ShapeFilter for DefaultShapeFilter {}
