use phys_shapes::collision::{AllHitCollector, RayCastFlags, RayCastResult, RayCastSettings};
use phys_shapes::error::ShapeError;
use phys_shapes::math::{Matrix4, Plane, Ray, Vector3};
use phys_shapes::shapes::{
    BoxShape, BoxShapeSettings, EmptyShapeSettings, MassProperties, Shape, ShapeSettings, ShapeSubType, Sphere,
    SphereSettings, SubShapeId, SubShapeIdCreator,
};
use std::f32::consts::PI;
use std::sync::Arc;
use approx::assert_relative_eq;

#[test]
fn test_sphere_creation() {
    let settings = SphereSettings::new(2.0);
    let shape = settings.create().unwrap();

    assert_eq!(shape.sub_type(), ShapeSubType::Sphere);
    assert!(Arc::ptr_eq(&shape, &settings.create().unwrap()));

    let properties = shape.mass_properties();
    assert_relative_eq!(properties.mass, 4.0 / 3.0 * PI * 8.0 * 1000.0, max_relative = 1e-5);

    // Invalid radius is reported every time
    let invalid = SphereSettings::new(0.0);
    assert!(matches!(invalid.create(), Err(ShapeError::InvalidParameter(_))));
    assert_eq!(invalid.create().unwrap_err(), invalid.create().unwrap_err());
}

#[test]
fn test_box_creation() {
    let shape = BoxShapeSettings::new(Vector3::new(1.0, 2.0, 3.0)).create().unwrap();
    assert_eq!(shape.sub_type(), ShapeSubType::Box);
    assert_relative_eq!(shape.mass_properties().mass, 48.0 * 1000.0, max_relative = 1e-5);

    let invalid = BoxShapeSettings::new(Vector3::new(1.0, 0.0, 3.0));
    assert!(matches!(invalid.create(), Err(ShapeError::InvalidParameter(_))));
}

#[test]
fn test_box_inertia_matches_solid_box() {
    let shape = BoxShape::new(Vector3::new(0.5, 1.0, 1.5));
    let expected = MassProperties::solid_box(Vector3::new(1.0, 2.0, 3.0), 1000.0);

    assert_eq!(shape.mass_properties(), expected);

    // Principal axes of a box are the coordinate axes
    let (_, moments) = expected.decompose_principal_moments_of_inertia().unwrap();
    let mut sorted = [moments.x, moments.y, moments.z];
    sorted.sort_by(f32::total_cmp);
    let mut diagonal = [expected.inertia.data[0][0], expected.inertia.data[1][1], expected.inertia.data[2][2]];
    diagonal.sort_by(f32::total_cmp);
    for (a, b) in sorted.iter().zip(diagonal.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-4);
    }
}

#[test]
fn test_sphere_ray_cast() {
    let sphere = Sphere::new(1.0);
    let ray = Ray::new(Vector3::new(-3.0, 0.0, 0.0), Vector3::new(6.0, 0.0, 0.0));

    let mut hit = RayCastResult::default();
    assert!(sphere.cast_ray(&ray, SubShapeIdCreator::default(), &mut hit));
    assert_relative_eq!(hit.fraction, 1.0 / 3.0, epsilon = 1e-5);

    // A farther hit does not replace a closer one
    let mut closer = RayCastResult { fraction: 0.1, ..Default::default() };
    assert!(!sphere.cast_ray(&ray, SubShapeIdCreator::default(), &mut closer));

    // Starting inside a solid sphere hits at 0
    let inside = Ray::new(Vector3::zero(), Vector3::new(6.0, 0.0, 0.0));
    let mut hit = RayCastResult::default();
    assert!(sphere.cast_ray(&inside, SubShapeIdCreator::default(), &mut hit));
    assert_eq!(hit.fraction, 0.0);
}

#[test]
fn test_hollow_ray_cast_from_inside() {
    let shape = BoxShape::new(Vector3::one());
    let ray = Ray::new(Vector3::zero(), Vector3::new(0.0, 4.0, 0.0));

    let hollow = RayCastSettings { flags: RayCastFlags::empty() };
    let mut collector: AllHitCollector<RayCastResult> = AllHitCollector::new();
    shape.cast_ray_collect(&ray, &hollow, SubShapeIdCreator::default(), &mut collector);
    assert!(!collector.had_hit());

    let back_faces = RayCastSettings { flags: RayCastFlags::COLLIDE_WITH_BACK_FACES };
    shape.cast_ray_collect(&ray, &back_faces, SubShapeIdCreator::default(), &mut collector);
    assert_eq!(collector.hits.len(), 1);
    assert_relative_eq!(collector.hits[0].fraction, 0.25, epsilon = 1e-5);
}

#[test]
fn test_sphere_submerged_volume() {
    let sphere = Sphere::new(1.0);
    let surface = Plane::horizontal(0.0);

    let half = sphere.submerged_volume(&Matrix4::identity(), Vector3::one(), &surface);
    assert_relative_eq!(half.submerged_volume, half.total_volume * 0.5, max_relative = 1e-4);
    assert_relative_eq!(half.center_of_buoyancy, Vector3::new(0.0, -3.0 / 8.0, 0.0), epsilon = 1e-4);

    let above = sphere.submerged_volume(&Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0)), Vector3::one(), &surface);
    assert_eq!(above.submerged_volume, 0.0);
}

#[test]
fn test_box_surface_normal() {
    let shape = BoxShape::new(Vector3::new(1.0, 2.0, 3.0));

    assert_eq!(shape.surface_normal(SubShapeId::EMPTY, Vector3::new(0.9, 0.0, 0.0)), Vector3::unit_x());
    assert_eq!(shape.surface_normal(SubShapeId::EMPTY, Vector3::new(0.0, -2.0, 1.0)), -Vector3::unit_y());
    assert_eq!(shape.surface_normal(SubShapeId::EMPTY, Vector3::new(0.2, 0.1, 2.95)), Vector3::unit_z());
}

#[test]
fn test_scale_validity_of_primitives() {
    let sphere = Sphere::new(1.0);
    let shape = BoxShape::new(Vector3::one());

    assert!(sphere.is_valid_scale(Vector3::replicate(3.0)));
    assert!(!sphere.is_valid_scale(Vector3::new(1.0, 1.0, 2.0)));
    assert!(shape.is_valid_scale(Vector3::new(1.0, -1.0, 2.0)));
    assert!(!shape.is_valid_scale(Vector3::new(1.0, 1e-7, 2.0)));
}

#[test]
fn test_empty_shape() {
    let settings = EmptyShapeSettings::default();
    let shape = settings.create().unwrap();

    assert_eq!(shape.sub_type(), ShapeSubType::Empty);
    assert_eq!(shape.mass_properties().mass, 0.0);

    let mut hit = RayCastResult::default();
    let ray = Ray::new(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0));
    assert!(!shape.cast_ray(&ray, SubShapeIdCreator::default(), &mut hit));
}

#[test]
fn test_sub_shape_id_path() {
    let creator = SubShapeIdCreator::default().push_id(2, 3).push_id(1, 1);
    let id = creator.id();
    assert_eq!(creator.num_bits_written(), 4);

    let (first, remainder) = id.pop_id(3);
    assert_eq!(first, 2);
    let (second, remainder) = remainder.pop_id(1);
    assert_eq!(second, 1);
    assert!(remainder.is_empty());
}
