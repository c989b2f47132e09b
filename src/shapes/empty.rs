use crate::collision::{
    cast_no_result, collide_no_result, CollidePointResult, CollisionCollector, CollisionDispatch, RayCastResult,
    RayCastSettings, ShapeFilter, TransformedShape,
};
use crate::math::{Aabb, Matrix4, Plane, Quaternion, Ray, Vector3};
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::shape::{collect_leaf_shape, transform_leaf_shape};
use crate::shapes::{
    MassProperties, PhysicsMaterial, Shape, ShapeResult, ShapeSettings, ShapeStats, ShapeSubType, SubShapeId,
    SubShapeIdCreator, SubmergedVolume,
};
use std::any::Any;
use std::sync::{Arc, OnceLock};

/// Settings to build an [`EmptyShape`]
#[derive(Debug, Default)]
pub struct EmptyShapeSettings {
    pub user_data: u64,

    cached_result: OnceLock<ShapeResult>,
}

impl ShapeSettings for EmptyShapeSettings {
    fn create(&self) -> ShapeResult {
        self.cached_result
            .get_or_init(|| Ok(Arc::new(EmptyShape { user_data: self.user_data }) as Arc<dyn Shape>))
            .clone()
    }
}

/// A shape without volume that never collides.
///
/// Also stands in for the inner shape of a decorator while it is being restored.
#[derive(Debug, Clone, Default)]
pub struct EmptyShape {
    user_data: u64,
}

impl EmptyShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers handlers that report nothing for every pair involving an empty shape
    pub fn register(dispatch: &mut CollisionDispatch) {
        for sub_type in ShapeSubType::ALL {
            dispatch.register_collide_shape(ShapeSubType::Empty, sub_type, collide_no_result);
            dispatch.register_collide_shape(sub_type, ShapeSubType::Empty, collide_no_result);
            dispatch.register_cast_shape(ShapeSubType::Empty, sub_type, cast_no_result);
            dispatch.register_cast_shape(sub_type, ShapeSubType::Empty, cast_no_result);
        }
    }
}

impl Shape for EmptyShape {
    fn sub_type(&self) -> ShapeSubType {
        ShapeSubType::Empty
    }

    fn mass_properties(&self) -> MassProperties {
        MassProperties::default()
    }

    fn local_bounds(&self) -> Aabb {
        Aabb::new(Vector3::zero(), Vector3::zero())
    }

    fn user_data(&self) -> u64 {
        self.user_data
    }

    fn material(&self, _sub_shape_id: SubShapeId) -> &PhysicsMaterial {
        PhysicsMaterial::default_material()
    }

    fn surface_normal(&self, _sub_shape_id: SubShapeId, _local_surface_position: Vector3) -> Vector3 {
        Vector3::zero()
    }

    fn submerged_volume(&self, _transform: &Matrix4, _scale: Vector3, _surface: &Plane) -> SubmergedVolume {
        SubmergedVolume::default()
    }

    fn cast_ray(&self, _ray: &Ray, _id_creator: SubShapeIdCreator, _hit: &mut RayCastResult) -> bool {
        false
    }

    fn cast_ray_collect(
        &self,
        _ray: &Ray,
        _settings: &RayCastSettings,
        _id_creator: SubShapeIdCreator,
        _collector: &mut dyn CollisionCollector<RayCastResult>,
    ) {
    }

    fn collide_point(
        &self,
        _point: Vector3,
        _id_creator: SubShapeIdCreator,
        _collector: &mut dyn CollisionCollector<CollidePointResult>,
    ) {
    }

    fn sub_shape_transformed_shape(
        self: Arc<Self>,
        sub_shape_id: SubShapeId,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
    ) -> (TransformedShape, SubShapeId) {
        (TransformedShape::new(position_com, rotation, self).with_scale(scale), sub_shape_id)
    }

    fn collect_transformed_shapes(
        self: Arc<Self>,
        _bounds: &Aabb,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<TransformedShape>,
        filter: &dyn ShapeFilter,
    ) {
        collect_leaf_shape(self, position_com, rotation, scale, id_creator, collector, filter);
    }

    fn transform_shape(
        self: Arc<Self>,
        center_of_mass_transform: &Matrix4,
        collector: &mut dyn CollisionCollector<TransformedShape>,
    ) {
        transform_leaf_shape(self, center_of_mass_transform, collector);
    }

    fn stats(&self) -> ShapeStats {
        ShapeStats::new(std::mem::size_of::<Self>(), 0)
    }

    fn save_binary_state(&self, stream: &mut dyn StreamOut) {
        stream.write_u64(self.user_data);
    }

    fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()> {
        self.user_data = stream.read_u64()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
