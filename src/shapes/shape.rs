use crate::collision::{
    CollidePointResult, CollisionCollector, CollisionDispatch, RayCastResult, RayCastSettings,
    ShapeCast, ShapeCastResult, ShapeCastSettings, ShapeFilter, TransformedShape,
};
use crate::math::{Aabb, Matrix4, Plane, Quaternion, Ray, Vector3};
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::scale_helpers;
use crate::shapes::{MassProperties, PhysicsMaterial, SubShapeId, SubShapeIdCreator};
use std::any::Any;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Broad category of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// Convex primitive with a support function
    Convex,

    /// Shape wrapping a single inner shape
    Decorated,

    /// Anything else
    Other,
}

/// Concrete kind of a shape, used as the key for collision dispatch and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeSubType {
    Empty,
    Sphere,
    Box,
    RotatedTranslated,
}

impl ShapeSubType {
    /// Every sub type, in wire code order
    pub const ALL: [ShapeSubType; 4] = [
        ShapeSubType::Empty,
        ShapeSubType::Sphere,
        ShapeSubType::Box,
        ShapeSubType::RotatedTranslated,
    ];

    /// Stable code written to binary streams
    pub fn code(self) -> u32 {
        match self {
            ShapeSubType::Empty => 0,
            ShapeSubType::Sphere => 1,
            ShapeSubType::Box => 2,
            ShapeSubType::RotatedTranslated => 3,
        }
    }

    /// Inverse of [`ShapeSubType::code`]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|sub_type| sub_type.code() == code)
    }

    /// Category the sub type belongs to
    pub fn shape_type(self) -> ShapeType {
        match self {
            ShapeSubType::Sphere | ShapeSubType::Box => ShapeType::Convex,
            ShapeSubType::RotatedTranslated => ShapeType::Decorated,
            ShapeSubType::Empty => ShapeType::Other,
        }
    }
}

/// Memory and triangle statistics of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeStats {
    /// Bytes used by the shape
    pub size_bytes: usize,

    /// Number of triangles the shape consists of
    pub num_triangles: u32,
}

impl ShapeStats {
    pub fn new(size_bytes: usize, num_triangles: u32) -> Self {
        Self { size_bytes, num_triangles }
    }
}

impl std::ops::Add for ShapeStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.size_bytes + other.size_bytes, self.num_triangles + other.num_triangles)
    }
}

/// Tracks which shapes have been counted while walking a shape graph
#[derive(Debug, Default)]
pub struct VisitedShapes {
    visited: HashSet<usize>,
}

impl VisitedShapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the shape as visited, returning true if it had not been seen before
    pub fn first_visit<T: ?Sized>(&mut self, shape: &T) -> bool {
        self.visited.insert(shape as *const T as *const () as usize)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Stats of `shape` itself if this is its first visit, zero otherwise
pub fn stats_once<S: Shape + ?Sized>(shape: &S, visited: &mut VisitedShapes) -> ShapeStats {
    if visited.first_visit(shape) {
        shape.stats()
    } else {
        ShapeStats::default()
    }
}

/// List of shapes exposed by a shape for persistence
pub type ShapeList = Vec<Arc<dyn Shape>>;

/// Result of building a shape from its settings
pub type ShapeResult = crate::Result<Arc<dyn Shape>>;

/// Describes how to build a shape
pub trait ShapeSettings: Send + Sync + Debug {
    /// Builds the shape. Implementations memoize the result, so repeated calls
    /// return the same shape (or the same error).
    fn create(&self) -> ShapeResult;
}

/// Buoyancy data of a shape partially below a surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubmergedVolume {
    /// Total volume of the shape
    pub total_volume: f32,

    /// Volume of the part below the surface
    pub submerged_volume: f32,

    /// Center of the submerged volume, in the space of the passed transform
    pub center_of_buoyancy: Vector3,
}

/// Support mapping of a convex shape, in the shape's center of mass space
pub trait ConvexShape {
    /// Furthest point of the unscaled shape along `direction`
    fn support(&self, direction: Vector3) -> Vector3;

    /// Furthest point of the shape scaled by `scale` along `direction`
    fn scaled_support(&self, direction: Vector3, scale: Vector3) -> Vector3 {
        self.support(direction.component_mul(&scale)).component_mul(&scale)
    }
}

/// Base trait for collision shapes.
///
/// All geometry is expressed relative to the shape's center of mass. Transforms
/// passed to the queries place that center of mass in world space and scale is
/// applied in the shape's local space.
pub trait Shape: Send + Sync + Debug + 'static {
    /// Returns the category of the shape
    fn shape_type(&self) -> ShapeType {
        self.sub_type().shape_type()
    }

    /// Returns the concrete kind of the shape
    fn sub_type(&self) -> ShapeSubType;

    /// Center of mass relative to the shape's creation origin
    fn center_of_mass(&self) -> Vector3 {
        Vector3::zero()
    }

    fn mass_properties(&self) -> MassProperties;

    /// Bounding box in center of mass space
    fn local_bounds(&self) -> Aabb;

    /// Bounding box after scaling and transforming the shape
    fn world_bounds(&self, center_of_mass_transform: &Matrix4, scale: Vector3) -> Aabb {
        self.local_bounds().scaled(scale).transformed(center_of_mass_transform)
    }

    /// User data attached when the shape was created
    fn user_data(&self) -> u64;

    fn material(&self, sub_shape_id: SubShapeId) -> &PhysicsMaterial;

    /// User data of the leaf addressed by `sub_shape_id`
    fn sub_shape_user_data(&self, _sub_shape_id: SubShapeId) -> u64 {
        self.user_data()
    }

    /// Outward surface normal near `local_surface_position` (center of mass space)
    fn surface_normal(&self, sub_shape_id: SubShapeId, local_surface_position: Vector3) -> Vector3;

    /// Volume of the transformed shape below `surface`
    fn submerged_volume(&self, center_of_mass_transform: &Matrix4, scale: Vector3, surface: &Plane) -> SubmergedVolume;

    /// Casts a ray in center of mass space. Returns true and updates `hit` if a
    /// hit is found closer than `hit.fraction`.
    fn cast_ray(&self, ray: &Ray, id_creator: SubShapeIdCreator, hit: &mut RayCastResult) -> bool;

    /// Casts a ray in center of mass space, reporting every hit to `collector`
    fn cast_ray_collect(
        &self,
        ray: &Ray,
        settings: &RayCastSettings,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<RayCastResult>,
    );

    /// Reports a hit if `point` (center of mass space) lies inside the shape
    fn collide_point(
        &self,
        point: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<CollidePointResult>,
    );

    /// Casts `shape_cast` against this shape. Used by [`CollisionDispatch`] when no
    /// handler is registered for the pair.
    #[allow(clippy::too_many_arguments)]
    fn cast_shape(
        &self,
        _dispatch: &CollisionDispatch,
        shape_cast: &ShapeCast,
        _settings: &ShapeCastSettings,
        _scale: Vector3,
        _filter: &dyn ShapeFilter,
        _center_of_mass_transform2: &Matrix4,
        _id_creator1: SubShapeIdCreator,
        _id_creator2: SubShapeIdCreator,
        _collector: &mut dyn CollisionCollector<ShapeCastResult>,
    ) {
        log::warn!(
            "Shape cast of {:?} against {:?} is not supported",
            shape_cast.shape.sub_type(),
            self.sub_type()
        );
    }

    /// Returns the transformed leaf addressed by `sub_shape_id` and the part of the
    /// id that was not consumed
    fn sub_shape_transformed_shape(
        self: Arc<Self>,
        sub_shape_id: SubShapeId,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
    ) -> (TransformedShape, SubShapeId);

    /// Reports every leaf of the shape as a [`TransformedShape`]
    #[allow(clippy::too_many_arguments)]
    fn collect_transformed_shapes(
        self: Arc<Self>,
        bounds: &Aabb,
        position_com: Vector3,
        rotation: Quaternion,
        scale: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<TransformedShape>,
        filter: &dyn ShapeFilter,
    );

    /// Reports every leaf of the shape transformed by `center_of_mass_transform`
    fn transform_shape(
        self: Arc<Self>,
        center_of_mass_transform: &Matrix4,
        collector: &mut dyn CollisionCollector<TransformedShape>,
    );

    /// Exposes the child shapes for persistence
    fn save_sub_shape_state(&self, sub_shapes: &mut ShapeList) {
        sub_shapes.clear();
    }

    /// Restores the child shapes exposed by [`Shape::save_sub_shape_state`]
    fn restore_sub_shape_state(&mut self, sub_shapes: &[Arc<dyn Shape>]) {
        assert!(sub_shapes.is_empty(), "Shape has no sub shapes");
    }

    /// Memory statistics of this shape alone
    fn stats(&self) -> ShapeStats;

    /// Memory statistics of this shape and its children, counting every shape once
    fn stats_recursive(&self, visited: &mut VisitedShapes) -> ShapeStats {
        stats_once(self, visited)
    }

    /// Returns true if the shape can be scaled by `scale`
    fn is_valid_scale(&self, scale: Vector3) -> bool {
        !scale_helpers::is_zero_scale(scale)
    }

    /// Writes the shape's own state (without children) to `stream`
    fn save_binary_state(&self, stream: &mut dyn StreamOut);

    /// Reads the state written by [`Shape::save_binary_state`]
    fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()>;

    /// Returns a dynamic reference to any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Returns the support mapping if the shape is convex
    fn as_convex(&self) -> Option<&dyn ConvexShape> {
        None
    }
}

/// Emits a leaf shape as a single [`TransformedShape`] unless the filter rejects it
#[allow(clippy::too_many_arguments)]
pub(crate) fn collect_leaf_shape(
    shape: Arc<dyn Shape>,
    position_com: Vector3,
    rotation: Quaternion,
    scale: Vector3,
    id_creator: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<TransformedShape>,
    filter: &dyn ShapeFilter,
) {
    if !filter.should_collide(shape.as_ref(), id_creator.id()) {
        return;
    }

    let mut transformed = TransformedShape::new(position_com, rotation, shape).with_scale(scale);
    transformed.sub_shape_id_creator = id_creator;
    collector.add_hit(transformed);
}

/// Emits a leaf shape placed by an arbitrary center of mass transform
pub(crate) fn transform_leaf_shape(
    shape: Arc<dyn Shape>,
    center_of_mass_transform: &Matrix4,
    collector: &mut dyn CollisionCollector<TransformedShape>,
) {
    let decomposed = crate::math::Transform::from_matrix(center_of_mass_transform);
    collector.add_hit(
        TransformedShape::new(decomposed.position, decomposed.rotation, shape).with_scale(decomposed.scale),
    );
}

/// Fraction at which a ray with entry/exit fractions `(t_enter, t_exit)` first hits
/// a solid convex shape, if within `[0, 1]`
#[inline]
pub(crate) fn solid_ray_fraction(t_enter: f32, t_exit: f32) -> Option<f32> {
    if t_exit < 0.0 || t_enter > 1.0 {
        None
    } else {
        Some(t_enter.max(0.0))
    }
}

/// Reports the hits of a ray against a convex shape with entry/exit fractions
/// `(t_enter, t_exit)` along the (unclamped) line of the ray
pub(crate) fn report_convex_ray_hits(
    t_enter: f32,
    t_exit: f32,
    settings: &RayCastSettings,
    id_creator: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<RayCastResult>,
) {
    let sub_shape_id2 = id_creator.id();
    let report = |fraction: f32, collector: &mut dyn CollisionCollector<RayCastResult>| {
        if fraction < collector.early_out_fraction() {
            collector.add_hit(RayCastResult { fraction, sub_shape_id2 });
        }
    };

    if settings.treat_convex_as_solid() {
        if let Some(fraction) = solid_ray_fraction(t_enter, t_exit) {
            report(fraction, collector);
        }
        return;
    }

    // Hollow: report the surface crossings inside the ray
    if (0.0..=1.0).contains(&t_enter) {
        report(t_enter, collector);
    }
    if settings.collide_with_back_faces() && (0.0..=1.0).contains(&t_exit) && !collector.should_early_out() {
        report(t_exit, collector);
    }
}
