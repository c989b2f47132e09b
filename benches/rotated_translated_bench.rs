use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use phys_shapes::collision::{
    AllHitCollector, CollideShapeResult, CollideShapeSettings, CollisionDispatch, DefaultShapeFilter, RayCastResult,
};
use phys_shapes::math::{Matrix4, Quaternion, Ray, Vector3};
use phys_shapes::shapes::{BoxShape, RotatedTranslatedShape, Shape, Sphere, SubShapeIdCreator};
use std::hint::black_box;
use std::sync::Arc;

fn rotations() -> [(&'static str, Quaternion); 2] {
    [
        ("identity", Quaternion::identity()),
        ("rotated", Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0).normalize(), 0.7)),
    ]
}

fn bench_queries(c: &mut Criterion) {
    let inner: Arc<dyn Shape> = Arc::new(BoxShape::new(Vector3::new(1.0, 2.0, 3.0)));

    let mut ray_group = c.benchmark_group("rotated_translated_cast_ray");
    for (name, rotation) in rotations() {
        let shape = RotatedTranslatedShape::from_inner(Vector3::zero(), rotation, inner.clone())
            .expect("valid rotation");
        let ray = Ray::new(Vector3::new(-10.0, 0.1, 0.2), Vector3::new(20.0, 0.0, 0.0));

        ray_group.bench_with_input(BenchmarkId::from_parameter(name), &shape, |b, shape| {
            b.iter(|| {
                let mut hit = RayCastResult::default();
                black_box(shape.cast_ray(black_box(&ray), SubShapeIdCreator::default(), &mut hit));
                black_box(hit)
            })
        });
    }
    ray_group.finish();

    let mut bounds_group = c.benchmark_group("rotated_translated_world_bounds");
    let transform = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    for (name, rotation) in rotations() {
        let shape = RotatedTranslatedShape::from_inner(Vector3::zero(), rotation, inner.clone())
            .expect("valid rotation");

        bounds_group.bench_with_input(BenchmarkId::from_parameter(name), &shape, |b, shape| {
            b.iter(|| black_box(shape.world_bounds(black_box(&transform), Vector3::replicate(2.0))))
        });
    }
    bounds_group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatch = CollisionDispatch::with_default_handlers();
    let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(1.0));
    let other = Sphere::new(1.0);
    let settings = CollideShapeSettings::default();
    let transform2 = Matrix4::from_translation(Vector3::new(1.5, 0.0, 0.0));

    let mut group = c.benchmark_group("rotated_translated_collide_sphere");
    for (name, rotation) in rotations() {
        let shape = RotatedTranslatedShape::from_inner(Vector3::zero(), rotation, sphere.clone())
            .expect("valid rotation");

        group.bench_with_input(BenchmarkId::from_parameter(name), &shape, |b, shape| {
            b.iter(|| {
                let mut collector = AllHitCollector::<CollideShapeResult>::new();
                dispatch.collide_shape_vs_shape(
                    shape,
                    &other,
                    Vector3::one(),
                    Vector3::one(),
                    &Matrix4::identity(),
                    &transform2,
                    SubShapeIdCreator::default(),
                    SubShapeIdCreator::default(),
                    &settings,
                    &mut collector,
                    &DefaultShapeFilter,
                );
                black_box(collector.hits.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_queries, bench_dispatch);
criterion_main!(benches);
