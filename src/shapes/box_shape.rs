use crate::collision::{
    CollidePointResult, CollisionCollector, RayCastResult, RayCastSettings, ShapeFilter, TransformedShape,
};
use crate::error::ShapeError;
use crate::math::{Aabb, Matrix4, Plane, Quaternion, Ray, Vector3, EPSILON};
use crate::serialization::{StreamIn, StreamOut};
use crate::shapes::shape::{collect_leaf_shape, report_convex_ray_hits, solid_ray_fraction, transform_leaf_shape};
use crate::shapes::{
    ConvexShape, MassProperties, PhysicsMaterial, Shape, ShapeResult, ShapeSettings, ShapeStats,
    ShapeSubType, SubShapeId, SubShapeIdCreator, SubmergedVolume,
};
use std::any::Any;
use std::sync::{Arc, OnceLock};

/// Corner indices of the box faces, counter clockwise seen from outside.
/// Corner `i` has bit 0 set for +X, bit 1 for +Y and bit 2 for +Z (see [`Aabb::corners`]).
const FACES: [[usize; 4]; 6] = [
    [1, 3, 7, 5],
    [0, 4, 6, 2],
    [2, 6, 7, 3],
    [0, 1, 5, 4],
    [4, 5, 7, 6],
    [0, 2, 3, 1],
];

/// Settings to build a [`BoxShape`]
#[derive(Debug, Default)]
pub struct BoxShapeSettings {
    /// Half the size of the box along each axis
    pub half_extent: Vector3,

    /// Density of the box (kg/m^3)
    pub density: f32,

    pub material: Option<Arc<PhysicsMaterial>>,
    pub user_data: u64,

    cached_result: OnceLock<ShapeResult>,
}

impl BoxShapeSettings {
    pub fn new(half_extent: Vector3) -> Self {
        Self {
            half_extent,
            density: 1000.0,
            ..Default::default()
        }
    }
}

impl ShapeSettings for BoxShapeSettings {
    fn create(&self) -> ShapeResult {
        self.cached_result
            .get_or_init(|| {
                if self.half_extent.reduce_min() <= 0.0 {
                    return Err(ShapeError::InvalidParameter(format!(
                        "Invalid box half extent {}",
                        self.half_extent
                    )));
                }

                let shape = BoxShape {
                    half_extent: self.half_extent,
                    density: self.density,
                    material: self.material.clone(),
                    user_data: self.user_data,
                };
                Ok(Arc::new(shape) as Arc<dyn Shape>)
            })
            .clone()
    }
}

/// A box (cuboid) collision shape centered on its center of mass
#[derive(Debug, Clone)]
pub struct BoxShape {
    /// The half-extents of the box (half-width, half-height, half-depth)
    half_extent: Vector3,

    /// Density of the box (kg/m^3)
    density: f32,

    material: Option<Arc<PhysicsMaterial>>,
    user_data: u64,
}

impl BoxShape {
    /// Creates a new box with the given half-extents
    pub fn new(half_extent: Vector3) -> Self {
        Self {
            half_extent: half_extent.max(&Vector3::zero()),
            density: 1000.0,
            material: None,
            user_data: 0,
        }
    }

    /// Returns the half-extents of the box
    pub fn half_extent(&self) -> Vector3 {
        self.half_extent
    }

    /// Fractions along the ray where its line enters and leaves the box (slab test)
    fn ray_intersections(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_enter = f32::MIN;
        let mut t_exit = f32::MAX;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let extent = self.half_extent[axis];

            if direction.abs() < EPSILON {
                // Parallel to the slab
                if origin < -extent || origin > extent {
                    return None;
                }
                continue;
            }

            let t1 = (-extent - origin) / direction;
            let t2 = (extent - origin) / direction;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));

            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }
}

impl Default for BoxShape {
    fn default() -> Self {
        Self::new(Vector3::zero())
    }
}

impl ConvexShape for BoxShape {
    fn support(&self, direction: Vector3) -> Vector3 {
        let h = self.half_extent;
        Vector3::new(
            if direction.x < 0.0 { -h.x } else { h.x },
            if direction.y < 0.0 { -h.y } else { h.y },
            if direction.z < 0.0 { -h.z } else { h.z },
        )
    }
}

/// Keeps the part of a convex polygon on the negative side of `plane`
fn clip_polygon_below(polygon: &[Vector3], plane: &Plane) -> Vec<Vector3> {
    let mut result = Vec::with_capacity(polygon.len() + 1);

    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let d_current = plane.signed_distance(current);
        let d_next = plane.signed_distance(next);

        if d_current < 0.0 {
            result.push(current);
        }

        // Edge crosses the plane
        if (d_current < 0.0) != (d_next < 0.0) {
            let t = d_current / (d_current - d_next);
            result.push(current + (next - current) * t);
        }
    }

    result
}

impl Shape for BoxShape {
    fn sub_type(&self) -> ShapeSubType {
        ShapeSubType::Box
    }

    fn mass_properties(&self) -> MassProperties {
        MassProperties::solid_box(self.half_extent * 2.0, self.density)
    }

    fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(Vector3::zero(), self.half_extent)
    }

    fn user_data(&self) -> u64 {
        self.user_data
    }

    fn material(&self, _sub_shape_id: SubShapeId) -> &PhysicsMaterial {
        self.material.as_deref().unwrap_or(PhysicsMaterial::default_material())
    }

    fn surface_normal(&self, _sub_shape_id: SubShapeId, local_surface_position: Vector3) -> Vector3 {
        // Face closest to the position
        let distance = (local_surface_position.abs() - self.half_extent).abs();
        let axis = if distance.x <= distance.y && distance.x <= distance.z {
            0
        } else if distance.y <= distance.z {
            1
        } else {
            2
        };

        let sign = if local_surface_position[axis] < 0.0 { -1.0 } else { 1.0 };
        match axis {
            0 => Vector3::new(sign, 0.0, 0.0),
            1 => Vector3::new(0.0, sign, 0.0),
            _ => Vector3::new(0.0, 0.0, sign),
        }
    }

    fn submerged_volume(&self, center_of_mass_transform: &Matrix4, scale: Vector3, surface: &Plane) -> SubmergedVolume {
        let size = self.half_extent.component_mul(&scale) * 2.0;
        let total_volume = (size.x * size.y * size.z).abs();

        let transform = center_of_mass_transform.pre_scaled(scale);
        let corners = self.local_bounds().corners().map(|c| transform.multiply_point(c));

        // Sum the signed volumes of the tetrahedra between a point on the surface and
        // every clipped face. The cap lies in the surface and contributes nothing.
        let center = transform.translation();
        let reference = center - surface.normal * surface.signed_distance(center);

        let mut volume = 0.0;
        let mut weighted_centroid = Vector3::zero();
        for face in FACES {
            let polygon = clip_polygon_below(&face.map(|i| corners[i]), surface);
            for i in 1..polygon.len().saturating_sub(1) {
                let (a, b, c) = (polygon[0], polygon[i], polygon[i + 1]);
                let tetra_volume = (a - reference).dot(&(b - reference).cross(&(c - reference))) / 6.0;
                volume += tetra_volume;
                weighted_centroid += (reference + a + b + c) * (tetra_volume * 0.25);
            }
        }

        // Mirroring scales flip the winding of every face
        if volume.abs() <= f32::EPSILON {
            return SubmergedVolume { total_volume, ..Default::default() };
        }

        SubmergedVolume {
            total_volume,
            submerged_volume: volume.abs(),
            center_of_buoyancy: weighted_centroid / volume,
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
        if self.local_bounds().contains_point(point) {
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
        ShapeStats::new(std::mem::size_of::<Self>(), 12)
    }

    fn save_binary_state(&self, stream: &mut dyn StreamOut) {
        stream.write_u64(self.user_data);
        stream.write_f32(self.density);
        stream.write_vector3(self.half_extent);
    }

    fn restore_binary_state(&mut self, stream: &mut dyn StreamIn) -> crate::Result<()> {
        self.user_data = stream.read_u64()?;
        self.density = stream.read_f32()?;
        self.half_extent = stream.read_vector3()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_convex(&self) -> Option<&dyn ConvexShape> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn half_submerged_box() {
        let shape = BoxShape::new(Vector3::new(1.0, 1.0, 1.0));
        let result = shape.submerged_volume(&Matrix4::identity(), Vector3::one(), &Plane::horizontal(0.0));

        assert_relative_eq!(result.total_volume, 8.0, epsilon = 1e-4);
        assert_relative_eq!(result.submerged_volume, 4.0, epsilon = 1e-4);
        assert_relative_eq!(result.center_of_buoyancy, Vector3::new(0.0, -0.5, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn mirrored_box_fully_submerged() {
        let shape = BoxShape::new(Vector3::new(1.0, 2.0, 0.5));
        let transform = Matrix4::from_translation(Vector3::new(3.0, -10.0, 1.0));
        let result = shape.submerged_volume(&transform, Vector3::new(-1.0, 1.0, 1.0), &Plane::horizontal(0.0));

        assert_relative_eq!(result.submerged_volume, result.total_volume, epsilon = 1e-3);
        assert_relative_eq!(result.center_of_buoyancy, Vector3::new(3.0, -10.0, 1.0), epsilon = 1e-3);
    }
}
