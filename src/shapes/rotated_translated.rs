use crate::collision::{
    CollidePointResult, CollideShapeResult, CollideShapeSettings, CollisionCollector, CollisionDispatch,
    RayCastResult, RayCastSettings, ShapeCast, ShapeCastResult, ShapeCastSettings, ShapeFilter, TransformedShape,
};
use crate::error::ShapeError;
use crate::math::{Aabb, Matrix4, Plane, Quaternion, Ray, Rotation, Vector3};
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::{
    scale_helpers, DecoratedShape, DecoratedShapeSettings, EmptyShape, MassProperties, PhysicsMaterial, Shape,
    ShapeList, ShapeResult, ShapeSettings, ShapeStats, ShapeSubType, SubShapeId, SubShapeIdCreator,
    SubmergedVolume, VisitedShapes,
};
use std::any::Any;
use std::sync::{Arc, OnceLock};

/// Maximum deviation of the squared length of a rotation from one
const ROTATION_NORMALIZED_TOLERANCE: f32 = 1.0e-5;

/// Settings to build a [`RotatedTranslatedShape`]
#[derive(Debug, Default)]
pub struct RotatedTranslatedShapeSettings {
    /// Source of the inner shape
    pub decorated: DecoratedShapeSettings,

    /// Position of the inner shape's origin, relative to the decorator's origin
    pub position: Vector3,

    /// Rotation of the inner shape, must be normalized
    pub rotation: Quaternion,

    cached_result: OnceLock<ShapeResult>,
}

impl RotatedTranslatedShapeSettings {
    /// Wraps a shape that still has to be built from its settings
    pub fn new(position: Vector3, rotation: Quaternion, inner_shape: Arc<dyn ShapeSettings>) -> Self {
        Self {
            decorated: DecoratedShapeSettings::from_settings(inner_shape),
            position,
            rotation,
            cached_result: OnceLock::new(),
        }
    }

    /// Wraps an already built shape
    pub fn from_shape(position: Vector3, rotation: Quaternion, inner_shape: Arc<dyn Shape>) -> Self {
        Self {
            decorated: DecoratedShapeSettings::from_shape(inner_shape),
            position,
            rotation,
            cached_result: OnceLock::new(),
        }
    }

    /// Forgets the memoized shape so the next [`ShapeSettings::create`] builds a new one
    pub fn clear_cached_result(&mut self) {
        self.cached_result.take();
    }
}

impl ShapeSettings for RotatedTranslatedShapeSettings {
    fn create(&self) -> ShapeResult {
        self.cached_result
            .get_or_init(|| RotatedTranslatedShape::new(self).map(|shape| Arc::new(shape) as Arc<dyn Shape>))
            .clone()
    }
}

/// Rotates and translates an inner shape.
///
/// The decorator is centered on the inner shape's center of mass, so only the
/// rotation has to be applied when forwarding queries. The translation is folded
/// into [`Shape::center_of_mass`].
#[derive(Debug, Clone)]
pub struct RotatedTranslatedShape {
    decorated: DecoratedShape,

    /// Center of mass of the inner shape in the decorator's space
    center_of_mass: Vector3,

    rotation: Quaternion,

    /// Cached `rotation.is_identity()`, only used to skip rotating scales
    is_rotation_identity: bool,
}

impl RotatedTranslatedShape {
    pub fn new(settings: &RotatedTranslatedShapeSettings) -> crate::Result<Self> {
        let decorated = DecoratedShape::new(&settings.decorated)?;

        if !settings.rotation.is_normalized(ROTATION_NORMALIZED_TOLERANCE) {
            return Err(ShapeError::InvalidParameter(format!(
                "Rotation {} is not normalized",
                settings.rotation
            )));
        }

        let center_of_mass =
            settings.position + settings.rotation.rotate_vector(decorated.inner_shape().center_of_mass());

        let mut shape = Self {
            decorated,
            center_of_mass,
            rotation: Quaternion::identity(),
            is_rotation_identity: true,
        };
        shape.set_rotation(settings.rotation);

        log::debug!(
            "Created rotated translated shape around {:?}, center of mass {}, identity rotation: {}",
            shape.inner_shape().sub_type(),
            shape.center_of_mass,
            shape.is_rotation_identity
        );
        Ok(shape)
    }

    /// Wraps `inner_shape` without going through memoized settings
    pub fn from_inner(position: Vector3, rotation: Quaternion, inner_shape: Arc<dyn Shape>) -> crate::Result<Self> {
        Self::new(&RotatedTranslatedShapeSettings::from_shape(position, rotation, inner_shape))
    }

    fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation;
        self.is_rotation_identity = rotation.is_identity();
    }

    #[inline]
    pub fn inner_shape(&self) -> &Arc<dyn Shape> {
        self.decorated.inner_shape()
    }

    /// Rotation of the inner shape
    #[inline]
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    #[inline]
    pub fn is_rotation_identity(&self) -> bool {
        self.is_rotation_identity
    }

    /// Converts a scale applied to the decorator into the scale to apply to the inner shape
    pub fn transform_scale(&self, scale: Vector3) -> Vector3 {
        if self.is_rotation_identity || scale_helpers::is_uniform_scale(scale) {
            scale
        } else {
            scale_helpers::rotate_scale(&self.rotation, scale)
        }
    }

    /// Rotation as a matrix
    #[inline]
    fn rotation_matrix(&self) -> Matrix4 {
        Matrix4::from_rotation(self.rotation)
    }

    /// Inverse rotation as a matrix, takes the decorator's space to the inner shape's space
    #[inline]
    fn inverse_rotation_matrix(&self) -> Matrix4 {
        Matrix4::from_rotation(self.rotation.conjugate())
    }

    /// Brings a ray into the inner shape's space
    fn inner_ray(&self, ray: &Ray) -> Ray {
        ray.transformed(&self.inverse_rotation_matrix())
    }

    /// Registers the collide and cast handlers that unwrap the decorator
    pub fn register(dispatch: &mut CollisionDispatch) {
        for sub_type in ShapeSubType::ALL {
            dispatch.register_collide_shape(
                ShapeSubType::RotatedTranslated,
                sub_type,
                collide_rotated_translated_vs_shape,
            );
            dispatch.register_collide_shape(
                sub_type,
                ShapeSubType::RotatedTranslated,
                collide_shape_vs_rotated_translated,
            );
            dispatch.register_cast_shape(ShapeSubType::RotatedTranslated, sub_type, cast_rotated_translated_vs_shape);
        }
    }
}

impl Default for RotatedTranslatedShape {
    /// Decorator around an [`EmptyShape`], to be overwritten when restoring from a stream
    fn default() -> Self {
        Self {
            decorated: DecoratedShape::from_inner(Arc::new(EmptyShape::new())),
            center_of_mass: Vector3::zero(),
            rotation: Quaternion::identity(),
            is_rotation_identity: true,
        }
    }
}

/// Downcasts a dispatch operand that was registered as a rotated translated shape
fn as_rotated_translated(shape: &dyn Shape) -> Option<&RotatedTranslatedShape> {
    let result = shape.as_any().downcast_ref::<RotatedTranslatedShape>();
    if result.is_none() {
        log::error!("Expected a rotated translated shape, got {:?}", shape.sub_type());
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn collide_rotated_translated_vs_shape(
    dispatch: &CollisionDispatch,
    shape1: &dyn Shape,
    shape2: &dyn Shape,
    scale1: Vector3,
    scale2: Vector3,
    center_of_mass_transform1: &Matrix4,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    settings: &CollideShapeSettings,
    collector: &mut dyn CollisionCollector<CollideShapeResult>,
    filter: &dyn ShapeFilter,
) {
    let Some(decorator) = as_rotated_translated(shape1) else {
        return;
    };

    log::trace!("Unwrapping rotated translated shape 1 for {:?}", shape2.sub_type());
    let transform1 = center_of_mass_transform1.multiply_matrix(&decorator.rotation_matrix());
    dispatch.collide_shape_vs_shape(
        decorator.inner_shape().as_ref(),
        shape2,
        decorator.transform_scale(scale1),
        scale2,
        &transform1,
        center_of_mass_transform2,
        id_creator1,
        id_creator2,
        settings,
        collector,
        filter,
    );
}

#[allow(clippy::too_many_arguments)]
fn collide_shape_vs_rotated_translated(
    dispatch: &CollisionDispatch,
    shape1: &dyn Shape,
    shape2: &dyn Shape,
    scale1: Vector3,
    scale2: Vector3,
    center_of_mass_transform1: &Matrix4,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    settings: &CollideShapeSettings,
    collector: &mut dyn CollisionCollector<CollideShapeResult>,
    filter: &dyn ShapeFilter,
) {
    let Some(decorator) = as_rotated_translated(shape2) else {
        return;
    };

    log::trace!("Unwrapping rotated translated shape 2 for {:?}", shape1.sub_type());
    let transform2 = center_of_mass_transform2.multiply_matrix(&decorator.rotation_matrix());
    dispatch.collide_shape_vs_shape(
        shape1,
        decorator.inner_shape().as_ref(),
        scale1,
        decorator.transform_scale(scale2),
        center_of_mass_transform1,
        &transform2,
        id_creator1,
        id_creator2,
        settings,
        collector,
        filter,
    );
}

#[allow(clippy::too_many_arguments)]
fn cast_rotated_translated_vs_shape(
    dispatch: &CollisionDispatch,
    shape_cast: &ShapeCast,
    settings: &ShapeCastSettings,
    shape: &dyn Shape,
    scale: Vector3,
    filter: &dyn ShapeFilter,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<ShapeCastResult>,
) {
    let Some(decorator) = as_rotated_translated(shape_cast.shape) else {
        return;
    };

    log::trace!("Unwrapping cast rotated translated shape against {:?}", shape.sub_type());
    let inner_cast = ShapeCast::new(
        decorator.inner_shape().as_ref(),
        decorator.transform_scale(shape_cast.scale),
        shape_cast.center_of_mass_start.multiply_matrix(&decorator.rotation_matrix()),
        shape_cast.direction,
    );
    dispatch.cast_shape_vs_shape(
        &inner_cast,
        settings,
        shape,
        scale,
        filter,
        center_of_mass_transform2,
        id_creator1,
        id_creator2,
        collector,
    );
}

impl Shape for RotatedTranslatedShape {
    fn sub_type(&self) -> ShapeSubType {
        ShapeSubType::RotatedTranslated
    }

    fn center_of_mass(&self) -> Vector3 {
        self.center_of_mass
    }

    fn mass_properties(&self) -> MassProperties {
        let mut properties = self.inner_shape().mass_properties();
        properties.rotate(&self.rotation.to_rotation_matrix());
        properties
    }

    fn local_bounds(&self) -> Aabb {
        self.inner_shape().local_bounds().transformed(&self.rotation_matrix())
    }

    fn world_bounds(&self, center_of_mass_transform: &Matrix4, scale: Vector3) -> Aabb {
        let transform = center_of_mass_transform.multiply_matrix(&self.rotation_matrix());
        self.inner_shape().world_bounds(&transform, self.transform_scale(scale))
    }

    fn user_data(&self) -> u64 {
        self.decorated.user_data()
    }

    fn material(&self, sub_shape_id: SubShapeId) -> &PhysicsMaterial {
        self.decorated.material(sub_shape_id)
    }

    fn sub_shape_user_data(&self, sub_shape_id: SubShapeId) -> u64 {
        self.decorated.sub_shape_user_data(sub_shape_id)
    }

    fn surface_normal(&self, sub_shape_id: SubShapeId, local_surface_position: Vector3) -> Vector3 {
        let transform = self.inverse_rotation_matrix();
        let normal = self
            .inner_shape()
            .surface_normal(sub_shape_id, transform.multiply_direction(local_surface_position));
        transform.multiply_direction_transposed(normal)
    }

    fn submerged_volume(&self, center_of_mass_transform: &Matrix4, scale: Vector3, surface: &Plane) -> SubmergedVolume {
        let transform = center_of_mass_transform.multiply_matrix(&self.rotation_matrix());
        self.inner_shape().submerged_volume(&transform, self.transform_scale(scale), surface)
    }

    fn cast_ray(&self, ray: &Ray, id_creator: SubShapeIdCreator, hit: &mut RayCastResult) -> bool {
        self.inner_shape().cast_ray(&self.inner_ray(ray), id_creator, hit)
    }

    fn cast_ray_collect(
        &self,
        ray: &Ray,
        settings: &RayCastSettings,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<RayCastResult>,
    ) {
        self.inner_shape().cast_ray_collect(&self.inner_ray(ray), settings, id_creator, collector);
    }

    fn collide_point(
        &self,
        point: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<CollidePointResult>,
    ) {
        let local_point = self.inverse_rotation_matrix().multiply_direction(point);
        self.inner_shape().collide_point(local_point, id_creator, collector);
    }

    fn cast_shape(
        &self,
        dispatch: &CollisionDispatch,
        shape_cast: &ShapeCast,
        settings: &ShapeCastSettings,
        scale: Vector3,
        filter: &dyn ShapeFilter,
        center_of_mass_transform2: &Matrix4,
        id_creator1: SubShapeIdCreator,
        id_creator2: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<ShapeCastResult>,
    ) {
        // The cast is in our space, bring it into the space of the inner shape
        let local_transform = self.rotation_matrix();
        let local_cast = shape_cast.post_transformed(&local_transform.transposed_3x3());
        let transform2 = center_of_mass_transform2.multiply_matrix(&local_transform);

        dispatch.cast_shape_vs_shape(
            &local_cast,
            settings,
            self.inner_shape().as_ref(),
            self.transform_scale(scale),
            filter,
            &transform2,
            id_creator1,
            id_creator2,
            collector,
        );
    }

    fn sub_shape_transformed_shape(
        self: Arc<Self>,
        sub_shape_id: SubShapeId,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
    ) -> (TransformedShape, SubShapeId) {
        // No bits of the id are used by the decorator
        let transformed = TransformedShape::new(position_com, rotation * self.rotation, self.inner_shape().clone())
            .with_scale(self.transform_scale(scale));
        (transformed, sub_shape_id)
    }

    fn collect_transformed_shapes(
        self: Arc<Self>,
        bounds: &Aabb,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<TransformedShape>,
        filter: &dyn ShapeFilter,
    ) {
        self.inner_shape().clone().collect_transformed_shapes(
            bounds,
            position_com,
            rotation * self.rotation,
            self.transform_scale(scale),
            id_creator,
            collector,
            filter,
        );
    }

    fn transform_shape(
        self: Arc<Self>,
        center_of_mass_transform: &Matrix4,
        collector: &mut dyn CollisionCollector<TransformedShape>,
    ) {
        let transform = center_of_mass_transform.multiply_matrix(&self.rotation_matrix());
        self.inner_shape().clone().transform_shape(&transform, collector);
    }

    fn save_sub_shape_state(&self, sub_shapes: &mut ShapeList) {
        self.decorated.save_sub_shape_state(sub_shapes);
    }

    fn restore_sub_shape_state(&mut self, sub_shapes: &[Arc<dyn Shape>]) {
        self.decorated.restore_sub_shape_state(sub_shapes);
    }

    fn stats(&self) -> ShapeStats {
        ShapeStats::new(std::mem::size_of::<Self>(), 0)
    }

    fn stats_recursive(&self, visited: &mut VisitedShapes) -> ShapeStats {
        self.decorated.stats_recursive(self, visited)
    }

    fn is_valid_scale(&self, scale: Vector3) -> bool {
        if scale_helpers::is_zero_scale(scale) {
            return false;
        }

        if self.is_rotation_identity || scale_helpers::is_uniform_scale(scale) {
            return self.inner_shape().is_valid_scale(scale);
        }

        if !scale_helpers::can_scale_be_rotated(&self.rotation, scale) {
            return false;
        }

        self.inner_shape()
            .is_valid_scale(scale_helpers::rotate_scale(&self.rotation, scale))
    }

    fn save_binary_state(&self, stream: &mut dyn StreamOut) {
        self.decorated.save_binary_state(stream);
        stream.write_vector3(self.center_of_mass);
        stream.write_quaternion(self.rotation);
    }

    fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()> {
        self.decorated.restore_binary_state(stream)?;
        self.center_of_mass = stream.read_vector3()?;
        let rotation = stream.read_quaternion()?;
        self.set_rotation(rotation);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
