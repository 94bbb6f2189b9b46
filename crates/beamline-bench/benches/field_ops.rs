//! Criterion micro-benchmarks for field evaluation.

use std::hint::black_box;
use std::sync::Arc;

use beamline_bench::sample_points;
use beamline_core::FieldModel;
use beamline_engine::BeamlineGeometry;
use beamline_field::{BeamlineField, CavityField, GuideField};
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: GuideField::evaluate at 10K points.
fn bench_guide_10k(c: &mut Criterion) {
    let guide = GuideField::builder().build().unwrap();
    let points = sample_points(10_000, 1);

    c.bench_function("guide_evaluate_10k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(guide.evaluate(*p, 0.0));
            }
        });
    });
}

/// Benchmark: CavityField::evaluate at 10K points, advancing time.
fn bench_cavity_10k(c: &mut Criterion) {
    let cavity = CavityField::builder().build().unwrap();
    let points = sample_points(10_000, 2);

    c.bench_function("cavity_evaluate_10k", |b| {
        b.iter(|| {
            for (i, p) in points.iter().enumerate() {
                black_box(cavity.evaluate(*p, i as f64 * 0.01));
            }
        });
    });
}

/// Benchmark: composite field with region lookup at 10K points.
fn bench_composite_10k(c: &mut Criterion) {
    let geometry = Arc::new(BeamlineGeometry::default());
    let field = BeamlineField::new(
        GuideField::builder().build().unwrap(),
        CavityField::builder().build().unwrap(),
        geometry,
    );
    let points = sample_points(10_000, 3);

    c.bench_function("composite_evaluate_10k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(field.evaluate(*p, 1.0));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_guide_10k,
    bench_cavity_10k,
    bench_composite_10k
);
criterion_main!(benches);
