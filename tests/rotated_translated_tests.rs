use phys_shapes::collision::{AllHitCollector, CollidePointResult, DefaultShapeFilter, RayCastResult, TransformedShape};
use phys_shapes::error::ShapeError;
use phys_shapes::math::{Aabb, Matrix3, Matrix4, Plane, Quaternion, Ray, Rotation, Vector3};
use phys_shapes::serialization::{restore_with_children, save_with_children, IdToShapeMap, ShapeToIdMap, SliceStreamIn, VecStreamOut};
use phys_shapes::shapes::{
    scale_helpers, BoxShape, BoxShapeSettings, RotatedTranslatedShape, RotatedTranslatedShapeSettings, Shape,
    ShapeSettings, Sphere, SphereSettings, SubShapeId, SubShapeIdCreator, VisitedShapes,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;
use approx::assert_relative_eq;

fn random_rotation(rng: &mut StdRng) -> Quaternion {
    let axis = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
    Quaternion::from_axis_angle(axis.normalized_or(Vector3::unit_y()), rng.gen_range(0.0..2.0 * PI))
}

fn quarter_turn_z() -> Quaternion {
    Quaternion::from_axis_angle(Vector3::unit_z(), FRAC_PI_2)
}

fn decorate(position: Vector3, rotation: Quaternion, inner: Arc<dyn Shape>) -> Arc<RotatedTranslatedShape> {
    Arc::new(RotatedTranslatedShape::from_inner(position, rotation, inner).unwrap())
}

#[test]
fn test_center_of_mass_and_inertia() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let shape: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));

    // The inner decorator moves the center of mass away from its origin
    let inner: Arc<dyn Shape> = decorate(Vector3::new(0.0, 1.0, 0.0), Quaternion::identity(), shape.clone());
    assert_eq!(inner.center_of_mass(), Vector3::new(0.0, 1.0, 0.0));

    for _ in 0..20 {
        let rotation = random_rotation(&mut rng);
        let position = Vector3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        let outer = decorate(position, rotation, inner.clone());

        let expected_com = position + rotation.rotate_vector(Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(outer.center_of_mass(), expected_com, epsilon = 1e-4);

        // Mass is unchanged, inertia is rotated into the decorator's frame
        let inner_properties = shape.mass_properties();
        let properties = outer.mass_properties();
        assert_relative_eq!(properties.mass, inner_properties.mass, max_relative = 1e-5);

        let r = rotation.to_rotation_matrix();
        let expected_inertia = r.multiply_matrix(&inner_properties.inertia).multiply_matrix(&r.transpose());
        let tolerance = 1e-4 * inner_properties.inertia.diagonal().reduce_max();
        assert!(properties.inertia.is_close(&expected_inertia, tolerance));
    }
}

#[test]
fn test_local_bounds_encloses_rotated_corners() {
    let mut rng = StdRng::seed_from_u64(42);
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(0.5, 1.5, 2.5)));

    for _ in 0..50 {
        let rotation = random_rotation(&mut rng);
        let shape = decorate(Vector3::new(3.0, 0.0, 0.0), rotation, inner.clone());
        let bounds = shape.local_bounds().expand(1e-4);

        for corner in inner.local_bounds().corners() {
            let rotated = rotation.rotate_vector(corner);
            assert!(bounds.contains_point(rotated), "{} outside {:?}", rotated, bounds);
        }
    }
}

#[test]
fn test_identity_rotation_keeps_bounds() {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));
    let shape = decorate(Vector3::new(1.0, 1.0, 1.0), Quaternion::identity(), inner.clone());

    assert!(shape.is_rotation_identity());
    assert_eq!(shape.local_bounds(), inner.local_bounds());
}

#[test]
fn test_near_identity_rotation_is_applied() {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1e4, 1e4, 1.0)));
    let rotation = Quaternion::from_axis_angle(Vector3::unit_z(), 1.5e-6);
    let shape = decorate(Vector3::zero(), rotation, inner.clone());

    // Counts as identity for scaling, but the bounds still follow the rotation
    assert!(shape.is_rotation_identity());
    let local = shape.local_bounds();
    assert_eq!(local, inner.local_bounds().transformed(&Matrix4::from_rotation(rotation)));
    assert_eq!(local, shape.world_bounds(&Matrix4::identity(), Vector3::one()));
    assert!(local.max.x > 1e4);

    for corner in inner.local_bounds().corners() {
        assert!(local.contains_point(Matrix4::from_rotation(rotation).multiply_point(corner)));
    }
}

#[test]
fn test_world_bounds_with_non_uniform_scale() {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));
    let shape = decorate(Vector3::zero(), quarter_turn_z(), inner);

    // The rotated box has half extents (2, 1, 3), scaled by (1, 2, 3)
    let bounds = shape.world_bounds(&Matrix4::from_translation(Vector3::unit_x()), Vector3::new(1.0, 2.0, 3.0));
    assert_relative_eq!(bounds.min, Vector3::new(-1.0, -2.0, -9.0), epsilon = 1e-4);
    assert_relative_eq!(bounds.max, Vector3::new(3.0, 2.0, 9.0), epsilon = 1e-4);
}

#[test]
fn test_save_restore_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));

    for rotation in [Quaternion::identity(), random_rotation(&mut rng), random_rotation(&mut rng)] {
        let shape: Arc<dyn Shape> = decorate(Vector3::new(1.0, -2.0, 3.0), rotation, inner.clone());

        let mut stream = VecStreamOut::new();
        save_with_children(Some(&shape), &mut stream, &mut ShapeToIdMap::new());

        let bytes = stream.into_inner();
        let restored = restore_with_children(&mut SliceStreamIn::new(&bytes), &mut IdToShapeMap::new())
            .unwrap()
            .unwrap();
        let restored = restored.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();
        let original = shape.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();

        assert_eq!(restored.center_of_mass(), original.center_of_mass());
        assert_eq!(restored.rotation(), original.rotation());
        assert_eq!(restored.is_rotation_identity(), rotation.is_identity());
        assert_eq!(restored.inner_shape().local_bounds(), inner.local_bounds());
    }
}

#[test]
fn test_truncated_stream_fails() {
    let shape: Arc<dyn Shape> = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(Sphere::new(1.0)));

    let mut stream = VecStreamOut::new();
    save_with_children(Some(&shape), &mut stream, &mut ShapeToIdMap::new());
    let bytes = stream.into_inner();

    let truncated = &bytes[..bytes.len() - 2];
    let result = restore_with_children(&mut SliceStreamIn::new(truncated), &mut IdToShapeMap::new());
    assert!(matches!(result, Err(ShapeError::Stream(_))));
}

#[test]
fn test_scale_validity() {
    let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(1.0));
    let cube: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::one()));
    let non_uniform = Vector3::new(1.0, 2.0, 3.0);

    // Identity rotation: the inner shape decides
    let identity_box = decorate(Vector3::zero(), Quaternion::identity(), cube.clone());
    let identity_sphere = decorate(Vector3::zero(), Quaternion::identity(), sphere.clone());
    assert!(identity_box.is_valid_scale(non_uniform));
    assert!(!identity_sphere.is_valid_scale(non_uniform));
    assert!(identity_sphere.is_valid_scale(Vector3::replicate(-2.0)));

    // Near zero scale is never valid
    assert!(!identity_box.is_valid_scale(Vector3::new(1.0, 0.0, 1.0)));

    // Any rotation accepts a uniform scale the inner shape accepts
    let skewed_sphere = decorate(Vector3::zero(), Quaternion::from_axis_angle(Vector3::unit_z(), 0.3), sphere.clone());
    assert!(skewed_sphere.is_valid_scale(Vector3::replicate(2.0)));

    // Non-uniform scale that would shear the inner shape
    let skewed_box = decorate(Vector3::zero(), Quaternion::from_axis_angle(Vector3::unit_z(), 0.3), cube.clone());
    assert!(!skewed_box.is_valid_scale(non_uniform));

    // Rotatable scale: valid if the inner shape accepts the rotated scale
    let turned_box = decorate(Vector3::zero(), quarter_turn_z(), cube);
    let turned_sphere = decorate(Vector3::zero(), quarter_turn_z(), sphere);
    assert!(turned_box.is_valid_scale(non_uniform));
    assert!(!turned_sphere.is_valid_scale(non_uniform));
}

#[test]
fn test_uniform_scale_is_rotatable() {
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..100 {
        let rotation = random_rotation(&mut rng);
        let scale = Vector3::replicate(rng.gen_range(0.1..10.0));

        assert!(scale_helpers::can_scale_be_rotated(&rotation, scale));
        assert_relative_eq!(scale_helpers::rotate_scale(&rotation, scale), scale, max_relative = 1e-4);
    }
}

#[test]
fn test_transform_scale() {
    let shape = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(BoxShape::new(Vector3::one())));

    assert_relative_eq!(shape.transform_scale(Vector3::new(1.0, 2.0, 3.0)), Vector3::new(2.0, 1.0, 3.0), epsilon = 1e-5);
    assert_eq!(shape.transform_scale(Vector3::replicate(3.0)), Vector3::replicate(3.0));
}

#[test]
fn test_missing_inner_shape() {
    let settings = RotatedTranslatedShapeSettings::default();
    assert_eq!(settings.create().unwrap_err(), ShapeError::InnerShapeMissing);
}

#[test]
fn test_inner_build_error_is_returned() {
    let inner = Arc::new(SphereSettings::new(-1.0));
    let expected = inner.create().unwrap_err();

    let settings = RotatedTranslatedShapeSettings::new(Vector3::zero(), Quaternion::identity(), inner);
    assert_eq!(settings.create().unwrap_err(), expected);
}

#[test]
fn test_direct_inner_shape_wins() {
    let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(1.0));
    let mut settings = RotatedTranslatedShapeSettings::new(
        Vector3::zero(),
        Quaternion::identity(),
        Arc::new(SphereSettings::new(-1.0)),
    );
    settings.decorated.inner_shape_ptr = Some(sphere.clone());

    let shape = settings.create().unwrap();
    let shape = shape.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();
    assert!(Arc::ptr_eq(shape.inner_shape(), &sphere));
}

#[test]
fn test_settings_are_memoized() {
    let mut settings = RotatedTranslatedShapeSettings::new(
        Vector3::new(0.0, 1.0, 0.0),
        quarter_turn_z(),
        Arc::new(BoxShapeSettings::new(Vector3::one())),
    );

    let first = settings.create().unwrap();
    let second = settings.create().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    settings.clear_cached_result();
    let third = settings.create().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));

    // The inner settings still hand out the same box
    let first = first.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();
    let third = third.as_any().downcast_ref::<RotatedTranslatedShape>().unwrap();
    assert!(Arc::ptr_eq(first.inner_shape(), third.inner_shape()));
}

#[test]
fn test_ray_cast_quarter_turn() {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));
    let shape = decorate(Vector3::zero(), quarter_turn_z(), inner.clone());
    let ray = Ray::new(Vector3::new(-10.0, 0.5, 0.2), Vector3::new(20.0, 0.0, 0.0));

    let mut hit = RayCastResult::default();
    assert!(shape.cast_ray(&ray, SubShapeIdCreator::default(), &mut hit));

    let local_ray = ray.transformed(&Matrix4::from_rotation(quarter_turn_z().conjugate()));
    let mut inner_hit = RayCastResult::default();
    assert!(inner.cast_ray(&local_ray, SubShapeIdCreator::default(), &mut inner_hit));

    assert_relative_eq!(hit.fraction, inner_hit.fraction, epsilon = 1e-5);
    assert_relative_eq!(hit.fraction, 0.4, epsilon = 1e-5);
}

#[test]
fn test_ray_cast_collect_reports_back_face() {
    use phys_shapes::collision::{RayCastFlags, RayCastSettings};

    let shape = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0))));
    let ray = Ray::new(Vector3::new(-10.0, 0.0, 0.0), Vector3::new(20.0, 0.0, 0.0));
    let settings = RayCastSettings { flags: RayCastFlags::COLLIDE_WITH_BACK_FACES };

    let mut collector: AllHitCollector<RayCastResult> = AllHitCollector::new();
    shape.cast_ray_collect(&ray, &settings, SubShapeIdCreator::default(), &mut collector);
    collector.sort();

    assert_eq!(collector.hits.len(), 2);
    assert_relative_eq!(collector.hits[0].fraction, 0.4, epsilon = 1e-5);
    assert_relative_eq!(collector.hits[1].fraction, 0.6, epsilon = 1e-5);
}

#[test]
fn test_collide_point() {
    let shape = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0))));

    // Inside the rotated box only
    let mut collector: AllHitCollector<CollidePointResult> = AllHitCollector::new();
    shape.collide_point(Vector3::new(1.5, 0.0, 0.0), SubShapeIdCreator::default(), &mut collector);
    assert_eq!(collector.hits.len(), 1);

    let mut collector: AllHitCollector<CollidePointResult> = AllHitCollector::new();
    shape.collide_point(Vector3::new(0.0, 1.5, 0.0), SubShapeIdCreator::default(), &mut collector);
    assert!(!collector.had_hit());
}

#[test]
fn test_surface_normal_is_rotated_back() {
    let shape = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(BoxShape::new(Vector3::one())));

    let normal = shape.surface_normal(SubShapeId::EMPTY, Vector3::new(0.0, 1.0, 0.2));
    assert_relative_eq!(normal, Vector3::unit_y(), epsilon = 1e-5);

    let normal = shape.surface_normal(SubShapeId::EMPTY, Vector3::new(-1.0, 0.1, 0.2));
    assert_relative_eq!(normal, -Vector3::unit_x(), epsilon = 1e-5);
}

#[test]
fn test_submerged_volume() {
    let shape = decorate(Vector3::zero(), quarter_turn_z(), Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0))));

    // After the turn the box reaches 1 above and below the surface
    let result = shape.submerged_volume(&Matrix4::identity(), Vector3::one(), &Plane::horizontal(0.0));
    assert_relative_eq!(result.total_volume, 48.0, epsilon = 1e-3);
    assert_relative_eq!(result.submerged_volume, 24.0, epsilon = 1e-3);
    assert_relative_eq!(result.center_of_buoyancy, Vector3::new(0.0, -0.5, 0.0), epsilon = 1e-4);
}

#[test]
fn test_shared_inner_counted_once() {
    let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(1.0));
    let a = decorate(Vector3::zero(), Quaternion::identity(), sphere.clone());
    let b = decorate(Vector3::unit_x(), quarter_turn_z(), sphere.clone());

    let mut visited = VisitedShapes::new();
    let total = a.stats_recursive(&mut visited) + b.stats_recursive(&mut visited);

    assert_eq!(total, a.stats() + b.stats() + sphere.stats());
    assert_eq!(visited.len(), 3);

    // Visiting again adds nothing
    assert_eq!(a.stats_recursive(&mut visited).size_bytes, 0);
}

#[test]
fn test_sub_shape_transformed_shape() {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::one()));
    let shape = decorate(Vector3::zero(), quarter_turn_z(), inner.clone());
    let caller_rotation = Quaternion::from_axis_angle(Vector3::unit_x(), 0.5);
    let id = SubShapeIdCreator::default().push_id(1, 2).id();

    let (transformed, remainder) = shape.sub_shape_transformed_shape(
        id,
        Vector3::new(1.0, 2.0, 3.0),
        caller_rotation,
        Vector3::new(1.0, 2.0, 3.0),
    );

    assert_eq!(remainder, id);
    assert!(Arc::ptr_eq(&transformed.shape, &inner));
    assert_eq!(transformed.shape_position_com, Vector3::new(1.0, 2.0, 3.0));
    assert_relative_eq!(transformed.shape_rotation, caller_rotation * quarter_turn_z(), epsilon = 1e-6);
    assert_relative_eq!(transformed.shape_scale, Vector3::new(2.0, 1.0, 3.0), epsilon = 1e-5);
}

#[test]
fn test_collect_transformed_shapes_nested() {
    let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(1.0));
    let inner_rotation = Quaternion::from_axis_angle(Vector3::unit_y(), 0.4);
    let inner: Arc<dyn Shape> = decorate(Vector3::zero(), inner_rotation, sphere.clone());
    let outer = decorate(Vector3::zero(), quarter_turn_z(), inner);

    let mut collector: AllHitCollector<TransformedShape> = AllHitCollector::new();
    outer.collect_transformed_shapes(
        &Aabb::from_center_half_extents(Vector3::zero(), Vector3::replicate(100.0)),
        Vector3::new(0.0, 5.0, 0.0),
        Quaternion::identity(),
        Vector3::replicate(2.0),
        SubShapeIdCreator::default(),
        &mut collector,
        &DefaultShapeFilter,
    );

    assert_eq!(collector.hits.len(), 1);
    let leaf = &collector.hits[0];
    assert!(Arc::ptr_eq(&leaf.shape, &sphere));
    assert_eq!(leaf.shape_position_com, Vector3::new(0.0, 5.0, 0.0));
    assert_relative_eq!(leaf.shape_rotation, quarter_turn_z() * inner_rotation, epsilon = 1e-6);
    assert_eq!(leaf.shape_scale, Vector3::replicate(2.0));

    // World space ray against the leaf
    let mut hit = RayCastResult::default();
    assert!(leaf.cast_ray(&Ray::new(Vector3::new(-10.0, 5.0, 0.0), Vector3::new(20.0, 0.0, 0.0)), &mut hit));
    assert_relative_eq!(hit.fraction, 0.4, epsilon = 1e-5);
}

#[test]
fn test_transform_shape() {
    let rotation = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0).normalize(), 0.8);
    let shape = decorate(Vector3::new(4.0, 0.0, 0.0), rotation, Arc::new(BoxShape::new(Vector3::one())));
    let placement = Matrix4::from_translation(Vector3::new(0.0, 0.0, 2.0));

    let mut collector: AllHitCollector<TransformedShape> = AllHitCollector::new();
    shape.transform_shape(&placement, &mut collector);

    assert_eq!(collector.hits.len(), 1);
    let leaf = &collector.hits[0];
    assert_relative_eq!(leaf.shape_position_com, Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
    assert_relative_eq!(leaf.shape_scale, Vector3::one(), epsilon = 1e-4);

    // The decomposed rotation may flip sign, compare its effect instead
    let v = Vector3::new(0.3, -1.0, 2.0);
    assert_relative_eq!(leaf.shape_rotation.rotate_vector(v), rotation.rotate_vector(v), epsilon = 1e-4);
}

#[test]
fn test_material_and_user_data_pass_through() {
    let mut settings = SphereSettings::new(1.0);
    settings.user_data = 99;
    let sphere = settings.create().unwrap();

    let mut decorator_settings = RotatedTranslatedShapeSettings::from_shape(Vector3::zero(), quarter_turn_z(), sphere.clone());
    decorator_settings.decorated.user_data = 5;
    let shape = decorator_settings.create().unwrap();

    assert_eq!(shape.user_data(), 5);
    assert_eq!(shape.sub_shape_user_data(SubShapeId::EMPTY), 99);
    assert_eq!(shape.material(SubShapeId::EMPTY).name, sphere.material(SubShapeId::EMPTY).name);
}

#[test]
fn test_mass_properties_inertia_is_symmetric() {
    let shape = decorate(
        Vector3::zero(),
        Quaternion::from_axis_angle(Vector3::new(1.0, 2.0, 3.0).normalize(), 0.9),
        Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0))),
    );

    let inertia = shape.mass_properties().inertia;
    let tolerance = 1e-5 * inertia.diagonal().reduce_max();
    assert!(inertia.is_close(&inertia.transpose(), tolerance));

    // A rotation that is not around a principal axis couples the axes
    assert!(!inertia.is_close(&Matrix3::from_diagonal(inertia.diagonal()), 1e3 * tolerance));
}
