// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used)]
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use xpbd_core::body::Body;
use xpbd_core::math::Vec3;
use xpbd_core::shape::Shape;
use xpbd_sim::{GroundPlane, SimConfig, XpbdSystem};

/// A `side × side` grid of spheres dropped onto the ground plane, close
/// enough that neighbours collide while falling.
fn build_grid(side: usize) -> XpbdSystem {
    let config = SimConfig {
        ground: Some(GroundPlane::default()),
        ..SimConfig::default()
    };
    let mut sys = XpbdSystem::new(config).expect("default config is valid");
    let shape = Arc::new(Shape::sphere(0.1).expect("sphere"));
    for i in 0..side {
        for j in 0..side {
            let pos = Vec3::new(i as f32 * 0.19, 0.5 + (i + j) as f32 * 0.05, j as f32 * 0.19);
            let body = Body::new(pos, 1.0).with_shape(Arc::clone(&shape));
            sys.add_object(body).expect("add_object");
        }
    }
    sys.initialize();
    sys
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("xpbd_step");
    for &side in &[2usize, 4, 8, 16] {
        let n = side * side;
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &side, |b, &side| {
            b.iter_batched(
                || build_grid(side),
                |mut sys| {
                    // Several ticks so the grid reaches contact.
                    for _ in 0..10 {
                        criterion::black_box(sys.step());
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_broad_phase_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase_pairs");
    for &side in &[4usize, 16, 32] {
        let sys = build_grid(side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &sys, |b, sys| {
            let mut out = Vec::new();
            b.iter(|| {
                out.clear();
                sys.broad_phase().collect_collision_pairs(&mut out);
                criterion::black_box(out.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_broad_phase_pairs);
criterion_main!(benches);
