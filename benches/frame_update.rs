use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Quat;

use glass_sketch::update::{advance_rotations, swoop_position};

/// Benchmark: per-frame rotation advance over growing object counts
fn bench_advance_rotations(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_rotations");

    for count in [4usize, 64, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rotations = vec![Quat::IDENTITY; count];
            b.iter(|| {
                advance_rotations(rotations.iter_mut(), black_box(0.016));
            });
        });
    }

    group.finish();
}

/// Benchmark: swoop path evaluation
fn bench_swoop_position(c: &mut Criterion) {
    c.bench_function("swoop_position", |b| {
        let mut time = 0.0f32;
        b.iter(|| {
            time += 0.016;
            black_box(swoop_position(black_box(time)));
        });
    });
}

criterion_group!(benches, bench_advance_rotations, bench_swoop_position);
criterion_main!(benches);
