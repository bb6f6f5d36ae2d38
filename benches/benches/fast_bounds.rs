// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Rect, Vec2};
use understory_benches::{Shape, build};
use understory_bounds::{Bounds, BoundsPool};
use understory_scene::BoundsContext;

fn bench_global_bounds(c: &mut Criterion) {
    let shapes = [
        ("deep_256", Shape::Deep(256), 257_u64),
        ("wide_4096", Shape::Wide(4096), 4097),
        (
            "mixed_4x6",
            Shape::Mixed {
                fanout: 4,
                depth: 6,
            },
            1 + 4 + 16 + 64 + 256 + 1024 + 4096,
        ),
    ];
    let mut group = c.benchmark_group("global_bounds");
    for (name, shape, nodes) in shapes {
        let (scene, stage) = build(shape);
        let mut ctx = BoundsContext::new();
        let mut out = Bounds::new();
        group.throughput(Throughput::Elements(nodes));
        group.bench_function(name, |b| {
            b.iter(|| {
                ctx.compute_global_bounds(&scene, black_box(stage), &mut out);
                black_box(out.rect())
            });
        });
    }
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let (mut scene, _) = build(Shape::Mixed {
        fanout: 4,
        depth: 6,
    });
    c.bench_function("commit/mixed_4x6", |b| {
        b.iter(|| black_box(scene.commit()));
    });
}

fn bench_bounds_ops(c: &mut Criterion) {
    let rects: Vec<Rect> = (0..1024)
        .map(|i| {
            let x = f64::from(i % 32) * 10.0;
            let y = f64::from(i / 32) * 10.0;
            Rect::new(x, y, x + 8.0, y + 8.0)
        })
        .collect();
    let tf = Affine::rotate(0.3).then_translate(Vec2::new(5.0, 5.0));

    let mut group = c.benchmark_group("bounds_ops");
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("add_rect_plain", |b| {
        b.iter(|| {
            let mut acc = Bounds::new();
            for r in &rects {
                acc.add_rect(*r, None);
            }
            black_box(acc)
        });
    });
    group.bench_function("add_rect_transformed", |b| {
        b.iter(|| {
            let mut acc = Bounds::new();
            for r in &rects {
                acc.add_rect(*r, Some(tf));
            }
            black_box(acc)
        });
    });
    group.bench_function("pool_scoped", |b| {
        let mut pool = BoundsPool::with_capacity(8);
        b.iter(|| {
            for r in &rects {
                pool.scoped(|_, scratch| {
                    scratch.add_rect(*r, Some(tf));
                    black_box(scratch.width());
                });
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_global_bounds, bench_commit, bench_bounds_ops);
criterion_main!(benches);
