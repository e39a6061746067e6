// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_placement::{Placement, PlacementOptions, resolve};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

const VIEWPORT: Size = Size::new(1280.0, 800.0);

fn gen_triggers(count: usize) -> Vec<Rect> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * (VIEWPORT.width - 40.0);
            let y0 = rng.next_f64() * (VIEWPORT.height - 20.0);
            Rect::from_origin_size((x0, y0), (40.0, 20.0))
        })
        .collect()
}

// Triggers along the edges, where flipping and ranking kick in.
fn gen_edge_triggers(count: usize) -> Vec<Rect> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|i| {
            let t = rng.next_f64();
            let (x0, y0) = match i % 4 {
                0 => (t * (VIEWPORT.width - 20.0), 2.0),
                1 => (t * (VIEWPORT.width - 20.0), VIEWPORT.height - 22.0),
                2 => (2.0, t * (VIEWPORT.height - 20.0)),
                _ => (VIEWPORT.width - 22.0, t * (VIEWPORT.height - 20.0)),
            };
            Rect::from_origin_size((x0, y0), (20.0, 20.0))
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let options = PlacementOptions::default();
    let cases = [
        ("random_small_surface", gen_triggers(1024), Size::new(200.0, 100.0)),
        ("edges_small_surface", gen_edge_triggers(1024), Size::new(200.0, 100.0)),
        // Too large for any side: always shifted.
        ("edges_oversized_surface", gen_edge_triggers(1024), Size::new(700.0, 500.0)),
    ];

    let mut group = c.benchmark_group("resolve");
    for (name, triggers, surface) in &cases {
        group.throughput(Throughput::Elements(triggers.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| {
                for (i, t) in triggers.iter().enumerate() {
                    let requested = Placement::ALL[i % 4];
                    black_box(resolve(
                        black_box(*t),
                        *surface,
                        requested,
                        VIEWPORT,
                        options,
                    ));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
