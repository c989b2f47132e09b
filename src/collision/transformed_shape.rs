use crate::collision::{
    CollidePointResult, CollisionCollector, CollisionResult, RayCastResult, RayCastSettings,
};
use crate::math::{Aabb, Matrix4, Quaternion, Ray, Rotation, Vector3};
use crate::shapes::{Shape, SubShapeIdCreator};
use std::sync::Arc;

/// A shape placed in world space, used to query leaves of a shape hierarchy directly
#[derive(Debug, Clone)]
pub struct TransformedShape {
    /// World position of the shape's center of mass
    pub shape_position_com: Vector3,

    /// World rotation of the shape
    pub shape_rotation: Quaternion,

    pub shape: Arc<dyn Shape>,

    /// Local scale of the shape
    pub shape_scale: Vector3,

    /// Sub shape id path leading to this shape
    pub sub_shape_id_creator: SubShapeIdCreator,
}

impl TransformedShape {
    pub fn new(shape_position_com: Vector3, shape_rotation: Quaternion, shape: Arc<dyn Shape>) -> Self {
        Self {
            shape_position_com,
            shape_rotation,
            shape,
            shape_scale: Vector3::one(),
            sub_shape_id_creator: SubShapeIdCreator::default(),
        }
    }

    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.shape_scale = scale;
        self
    }

    /// Transform from center of mass space to world space
    #[inline]
    pub fn center_of_mass_transform(&self) -> Matrix4 {
        Matrix4::from_quaternion_translation(self.shape_rotation, self.shape_position_com)
    }

    /// Transform from world space to center of mass space
    #[inline]
    pub fn inverse_center_of_mass_transform(&self) -> Matrix4 {
        self.center_of_mass_transform().inversed_rotation_translation()
    }

    /// Transform of the shape's creation origin
    pub fn world_transform(&self) -> Matrix4 {
        let mut transform = self.center_of_mass_transform();
        let com = self.shape.center_of_mass().component_mul(&self.shape_scale);
        transform.set_translation(self.shape_position_com - self.shape_rotation.rotate_vector(com));
        transform
    }

    pub fn world_bounds(&self) -> Aabb {
        self.shape.world_bounds(&self.center_of_mass_transform(), self.shape_scale)
    }

    /// Brings a world space ray into the unscaled center of mass space of the shape
    fn local_ray(&self, ray: &Ray) -> Ray {
        let local = ray.transformed(&self.inverse_center_of_mass_transform());
        let inv_scale = self.shape_scale.reciprocal();
        Ray::new(local.origin.component_mul(&inv_scale), local.direction.component_mul(&inv_scale))
    }

    /// Casts a world space ray, returns true if `hit` was updated with a closer hit
    pub fn cast_ray(&self, ray: &Ray, hit: &mut RayCastResult) -> bool {
        self.shape.cast_ray(&self.local_ray(ray), self.sub_shape_id_creator, hit)
    }

    /// Casts a world space ray, reporting every hit
    pub fn cast_ray_collect(
        &self,
        ray: &Ray,
        settings: &RayCastSettings,
        collector: &mut dyn CollisionCollector<RayCastResult>,
    ) {
        self.shape.cast_ray_collect(&self.local_ray(ray), settings, self.sub_shape_id_creator, collector);
    }

    /// Tests a world space point against the shape
    pub fn collide_point(&self, point: Vector3, collector: &mut dyn CollisionCollector<CollidePointResult>) {
        let local = self
            .inverse_center_of_mass_transform()
            .multiply_point(point)
            .component_mul(&self.shape_scale.reciprocal());
        self.shape.collide_point(local, self.sub_shape_id_creator, collector);
    }
}

impl CollisionResult for TransformedShape {
    fn early_out_fraction(&self) -> f32 {
        0.0
    }
}
