//! Collision handlers for pairs of convex primitives.

use crate::collision::gjk::{SupportMap, TransformedConvex, GJK};
use crate::collision::{
    CollideShapeResult, CollideShapeSettings, CollisionCollector, CollisionDispatch, ShapeCast,
    ShapeCastResult, ShapeCastSettings, ShapeFilter,
};
use crate::math::{Matrix4, Vector3, EPSILON};
use crate::shapes::{Shape, ShapeSubType, ShapeType, Sphere, SubShapeIdCreator};

/// Registers the handlers for every pair of convex sub types
pub struct ConvexHandlers;

/// Returns true if the sub type is a convex primitive
pub fn is_convex(sub_type: ShapeSubType) -> bool {
    sub_type.shape_type() == ShapeType::Convex
}

impl ConvexHandlers {
    pub fn register(dispatch: &mut CollisionDispatch) {
        for type1 in ShapeSubType::ALL.into_iter().filter(|t| is_convex(*t)) {
            for type2 in ShapeSubType::ALL.into_iter().filter(|t| is_convex(*t)) {
                dispatch.register_collide_shape(type1, type2, collide_convex_vs_convex);
                dispatch.register_cast_shape(type1, type2, cast_convex_vs_convex);
            }
        }

        dispatch.register_collide_shape(ShapeSubType::Sphere, ShapeSubType::Sphere, collide_sphere_vs_sphere);
        dispatch.register_cast_shape(ShapeSubType::Sphere, ShapeSubType::Sphere, cast_sphere_vs_sphere);
    }
}

/// Radius of a sphere under a (uniform) scale
#[inline]
fn scaled_radius(sphere: &Sphere, scale: Vector3) -> f32 {
    sphere.radius() * scale.x.abs()
}

#[allow(clippy::too_many_arguments)]
fn collide_sphere_vs_sphere(
    _dispatch: &CollisionDispatch,
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
    _filter: &dyn ShapeFilter,
) {
    let (Some(sphere1), Some(sphere2)) = (
        shape1.as_any().downcast_ref::<Sphere>(),
        shape2.as_any().downcast_ref::<Sphere>(),
    ) else {
        log::error!("Sphere handler called for {:?} vs {:?}", shape1.sub_type(), shape2.sub_type());
        return;
    };

    let radius1 = scaled_radius(sphere1, scale1);
    let radius2 = scaled_radius(sphere2, scale2);
    let center1 = center_of_mass_transform1.translation();
    let center2 = center_of_mass_transform2.translation();

    let delta = center2 - center1;
    let max_distance = radius1 + radius2 + settings.max_separation_distance;
    let distance_sq = delta.length_squared();
    if distance_sq > max_distance * max_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let axis = if distance > EPSILON { delta / distance } else { Vector3::unit_y() };
    let penetration_depth = radius1 + radius2 - distance;
    if -penetration_depth >= collector.early_out_fraction() {
        return;
    }

    collector.add_hit(CollideShapeResult {
        contact_point_on1: center1 + axis * radius1,
        contact_point_on2: center2 - axis * radius2,
        penetration_axis: axis,
        penetration_depth,
        sub_shape_id1: id_creator1.id(),
        sub_shape_id2: id_creator2.id(),
    });
}

#[allow(clippy::too_many_arguments)]
fn collide_convex_vs_convex(
    _dispatch: &CollisionDispatch,
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
    _filter: &dyn ShapeFilter,
) {
    let (Some(convex1), Some(convex2)) = (shape1.as_convex(), shape2.as_convex()) else {
        log::error!("Convex handler called for {:?} vs {:?}", shape1.sub_type(), shape2.sub_type());
        return;
    };

    // Inflate shape 1 so that shapes within the separation distance overlap
    let inflated1 = TransformedConvex {
        shape: convex1,
        transform: center_of_mass_transform1,
        scale: scale1,
        margin: settings.max_separation_distance,
    };
    let transformed2 = TransformedConvex {
        shape: convex2,
        transform: center_of_mass_transform2,
        scale: scale2,
        margin: 0.0,
    };

    let Some((depth, axis)) = GJK::penetration(&inflated1, &transformed2, settings.penetration_tolerance) else {
        return;
    };

    let penetration_depth = depth - settings.max_separation_distance;
    if -penetration_depth >= collector.early_out_fraction() {
        return;
    }

    let transformed1 = TransformedConvex { margin: 0.0, ..inflated1 };
    collector.add_hit(CollideShapeResult {
        contact_point_on1: transformed1.support(axis),
        contact_point_on2: transformed2.support(-axis),
        penetration_axis: axis,
        penetration_depth,
        sub_shape_id1: id_creator1.id(),
        sub_shape_id2: id_creator2.id(),
    });
}

/// Sweeps a sphere against a sphere located at the origin of the cast space
#[allow(clippy::too_many_arguments)]
fn cast_sphere_vs_sphere(
    _dispatch: &CollisionDispatch,
    shape_cast: &ShapeCast,
    settings: &ShapeCastSettings,
    shape: &dyn Shape,
    scale: Vector3,
    _filter: &dyn ShapeFilter,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<ShapeCastResult>,
) {
    let (Some(sphere1), Some(sphere2)) = (
        shape_cast.shape.as_any().downcast_ref::<Sphere>(),
        shape.as_any().downcast_ref::<Sphere>(),
    ) else {
        log::error!("Sphere cast handler called for {:?} vs {:?}", shape_cast.shape.sub_type(), shape.sub_type());
        return;
    };

    let radius1 = scaled_radius(sphere1, shape_cast.scale);
    let radius2 = scaled_radius(sphere2, scale);
    let radius = radius1 + radius2;
    let start = shape_cast.center_of_mass_start.translation();
    let direction = shape_cast.direction;

    let (fraction, center, penetration_depth) = if start.length_squared() <= radius * radius {
        // Start in collision
        let depth = if settings.return_deepest_point() { radius - start.length() } else { 0.0 };
        (0.0, start, depth)
    } else {
        // Solve |start + t * direction| = radius for the first t
        let a = direction.length_squared();
        let b = 2.0 * start.dot(&direction);
        let c = start.length_squared() - radius * radius;
        let discriminant = b * b - 4.0 * a * c;
        if a < EPSILON || discriminant < 0.0 {
            return;
        }

        let t = (-b - discriminant.sqrt()) / (2.0 * a);
        if !(0.0..=1.0).contains(&t) {
            return;
        }
        (t, start + direction * t, 0.0)
    };

    if fraction > collector.early_out_fraction() {
        return;
    }

    // Axis from the cast sphere towards the target
    let axis = (-center).normalized_or(direction.normalized_or(Vector3::unit_y()));
    let contact = CollideShapeResult {
        contact_point_on1: center_of_mass_transform2.multiply_point(center + axis * radius1),
        contact_point_on2: center_of_mass_transform2.multiply_point(-axis * radius2),
        penetration_axis: center_of_mass_transform2.multiply_direction(axis),
        penetration_depth,
        sub_shape_id1: id_creator1.id(),
        sub_shape_id2: id_creator2.id(),
    };

    collector.add_hit(ShapeCastResult { contact, fraction });
}

/// Sweeps any convex shape against a convex target located at the origin of the cast space
#[allow(clippy::too_many_arguments)]
fn cast_convex_vs_convex(
    _dispatch: &CollisionDispatch,
    shape_cast: &ShapeCast,
    settings: &ShapeCastSettings,
    shape: &dyn Shape,
    scale: Vector3,
    _filter: &dyn ShapeFilter,
    center_of_mass_transform2: &Matrix4,
    id_creator1: SubShapeIdCreator,
    id_creator2: SubShapeIdCreator,
    collector: &mut dyn CollisionCollector<ShapeCastResult>,
) {
    let (Some(convex1), Some(convex2)) = (shape_cast.shape.as_convex(), shape.as_convex()) else {
        log::error!("Convex cast handler called for {:?} vs {:?}", shape_cast.shape.sub_type(), shape.sub_type());
        return;
    };

    let identity = Matrix4::identity();
    let moving = TransformedConvex {
        shape: convex1,
        transform: &shape_cast.center_of_mass_start,
        scale: shape_cast.scale,
        margin: 0.0,
    };
    let target = TransformedConvex {
        shape: convex2,
        transform: &identity,
        scale,
        margin: 0.0,
    };

    let Some(hit) = GJK::cast(&moving, &target, shape_cast.direction) else {
        return;
    };
    if hit.fraction > collector.early_out_fraction() {
        return;
    }

    let fallback_axis = shape_cast.direction.normalized_or(Vector3::unit_y());
    let (axis, penetration_depth) = match (hit.fraction, settings.return_deepest_point()) {
        (fraction, true) if fraction <= 0.0 => GJK::penetration(&moving, &target, settings.penetration_tolerance)
            .map_or((fallback_axis, 0.0), |(depth, axis)| (axis.normalized_or(fallback_axis), depth)),
        // Axis from the cast shape towards the target
        _ => ((-hit.normal).normalized_or(fallback_axis), 0.0),
    };

    let contact = CollideShapeResult {
        contact_point_on1: center_of_mass_transform2.multiply_point(hit.point_on_a),
        contact_point_on2: center_of_mass_transform2.multiply_point(hit.point_on_b),
        penetration_axis: center_of_mass_transform2.multiply_direction(axis),
        penetration_depth,
        sub_shape_id1: id_creator1.id(),
        sub_shape_id2: id_creator2.id(),
    };

    collector.add_hit(ShapeCastResult { contact, fraction: hit.fraction });
}
