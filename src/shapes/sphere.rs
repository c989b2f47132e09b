use crate::collision::{
    CollidePointResult, CollisionCollector, RayCastResult, RayCastSettings, ShapeFilter, TransformedShape,
};
use crate::error::ShapeError;
use crate::math::{Aabb, Matrix3, Matrix4, Plane, Quaternion, Ray, Vector3};
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::shape::{collect_leaf_shape, report_convex_ray_hits, solid_ray_fraction, transform_leaf_shape};
use crate::shapes::{
    scale_helpers, ConvexShape, MassProperties, PhysicsMaterial, Shape, ShapeResult, ShapeSettings,
    ShapeStats, ShapeSubType, SubShapeId, SubShapeIdCreator, SubmergedVolume,
};
use std::any::Any;
use std::f32::consts::PI;
use std::sync::{Arc, OnceLock};

/// Settings to build a [`Sphere`]
#[derive(Debug, Default)]
pub struct SphereSettings {
    pub radius: f32,

    /// Density of the sphere (kg/m^3)
    pub density: f32,

    pub material: Option<Arc<PhysicsMaterial>>,
    pub user_data: u64,

    cached_result: OnceLock<ShapeResult>,
}

impl SphereSettings {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            density: 1000.0,
            ..Default::default()
        }
    }
}

impl ShapeSettings for SphereSettings {
    fn create(&self) -> ShapeResult {
        self.cached_result
            .get_or_init(|| {
                if self.radius <= 0.0 {
                    return Err(ShapeError::InvalidParameter(format!("Invalid sphere radius {}", self.radius)));
                }

                let sphere = Sphere {
                    radius: self.radius,
                    density: self.density,
                    material: self.material.clone(),
                    user_data: self.user_data,
                };
                Ok(Arc::new(sphere) as Arc<dyn Shape>)
            })
            .clone()
    }
}

/// A spherical collision shape, centered on its center of mass
#[derive(Debug, Clone)]
pub struct Sphere {
    /// The radius of the sphere
    radius: f32,

    /// Density of the sphere (kg/m^3)
    density: f32,

    material: Option<Arc<PhysicsMaterial>>,
    user_data: u64,
}

impl Sphere {
    /// Creates a new sphere with the given radius
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            density: 1000.0,
            material: None,
            user_data: 0,
        }
    }

    /// Returns the radius of the sphere
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Fractions along the ray where its line enters and leaves the sphere
    fn ray_intersections(&self, ray: &Ray) -> Option<(f32, f32)> {
        let a = ray.direction.length_squared();
        if a <= f32::EPSILON {
            return None;
        }

        let b = 2.0 * ray.origin.dot(&ray.direction);
        let c = ray.origin.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ConvexShape for Sphere {
    fn support(&self, direction: Vector3) -> Vector3 {
        direction.normalized_or(Vector3::zero()) * self.radius
    }
}

impl Shape for Sphere {
    fn sub_type(&self) -> ShapeSubType {
        ShapeSubType::Sphere
    }

    fn mass_properties(&self) -> MassProperties {
        // Volume of a sphere: (4/3) * π * r^3
        let mass = (4.0 / 3.0) * PI * self.radius.powi(3) * self.density;

        // I = (2/5) * mass * radius^2 on every axis
        let inertia = (2.0 / 5.0) * mass * self.radius * self.radius;
        MassProperties::new(mass, Matrix3::from_diagonal(Vector3::replicate(inertia)))
    }

    fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(Vector3::zero(), Vector3::replicate(self.radius))
    }

    fn world_bounds(&self, center_of_mass_transform: &Matrix4, scale: Vector3) -> Aabb {
        // Rotation does not change the bounds of a sphere
        let radius = self.radius * scale.x.abs();
        Aabb::from_center_half_extents(center_of_mass_transform.translation(), Vector3::replicate(radius))
    }

    fn user_data(&self) -> u64 {
        self.user_data
    }

    fn material(&self, _sub_shape_id: SubShapeId) -> &PhysicsMaterial {
        self.material.as_deref().unwrap_or(PhysicsMaterial::default_material())
    }

    fn surface_normal(&self, _sub_shape_id: SubShapeId, local_surface_position: Vector3) -> Vector3 {
        local_surface_position.normalized_or(Vector3::unit_y())
    }

    fn submerged_volume(&self, center_of_mass_transform: &Matrix4, scale: Vector3, surface: &Plane) -> SubmergedVolume {
        let radius = self.radius * scale.x.abs();
        let center = center_of_mass_transform.translation();
        let total_volume = (4.0 / 3.0) * PI * radius.powi(3);

        let distance = surface.signed_distance(center);
        if distance >= radius {
            return SubmergedVolume { total_volume, ..Default::default() };
        }
        if distance <= -radius {
            return SubmergedVolume {
                total_volume,
                submerged_volume: total_volume,
                center_of_buoyancy: center,
            };
        }

        // Spherical cap below the surface with height h
        let h = radius - distance;
        let submerged_volume = PI * h * h * (3.0 * radius - h) / 3.0;
        let centroid_distance = 3.0 * (2.0 * radius - h).powi(2) / (4.0 * (3.0 * radius - h));

        SubmergedVolume {
            total_volume,
            submerged_volume,
            center_of_buoyancy: center - surface.normal * centroid_distance,
        }
    }

    fn cast_ray(&self, ray: &Ray, id_creator: SubShapeIdCreator, hit: &mut RayCastResult) -> bool {
        let Some(fraction) = self
            .ray_intersections(ray)
            .and_then(|(enter, exit)| solid_ray_fraction(enter, exit))
        else {
            return false;
        };

        if fraction < hit.fraction {
            hit.fraction = fraction;
            hit.sub_shape_id2 = id_creator.id();
            true
        } else {
            false
        }
    }

    fn cast_ray_collect(
        &self,
        ray: &Ray,
        settings: &RayCastSettings,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<RayCastResult>,
    ) {
        if let Some((enter, exit)) = self.ray_intersections(ray) {
            report_convex_ray_hits(enter, exit, settings, id_creator, collector);
        }
    }

    fn collide_point(
        &self,
        point: Vector3,
        id_creator: SubShapeIdCreator,
        collector: &mut dyn CollisionCollector<CollidePointResult>,
    ) {
        if point.length_squared() <= self.radius * self.radius {
            collector.add_hit(CollidePointResult { sub_shape_id2: id_creator.id() });
        }
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

    fn is_valid_scale(&self, scale: Vector3) -> bool {
        !scale_helpers::is_zero_scale(scale) && scale_helpers::is_uniform_scale(scale.abs())
    }

    fn save_binary_state(&self, stream: &mut dyn StreamOut) {
        stream.write_u64(self.user_data);
        stream.write_f32(self.density);
        stream.write_f32(self.radius);
    }

    fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()> {
        self.user_data = stream.read_u64()?;
        self.density = stream.read_f32()?;
        self.radius = stream.read_f32()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_convex(&self) -> Option<&dyn ConvexShape> {
        Some(self)
    }
}
