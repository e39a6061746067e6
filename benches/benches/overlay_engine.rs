// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_overlay::config::OverlayConfig;
use understory_overlay::engine::{MeasureOverlays, OverlayEngine, TriggerEvent};

const OVERLAYS: u32 = 256;

struct Grid;

impl MeasureOverlays<u32> for Grid {
    fn trigger_bounds(&self, overlay: &u32) -> Option<Rect> {
        let x = f64::from(overlay % 16) * 80.0;
        let y = f64::from(overlay / 16) * 50.0;
        Some(Rect::from_origin_size((x, y), (40.0, 20.0)))
    }

    fn surface_size(&self, _: &u32) -> Option<Size> {
        Some(Size::new(200.0, 100.0))
    }
}

fn engine() -> OverlayEngine<u32> {
    let mut engine = OverlayEngine::new(Size::new(1280.0, 800.0));
    for k in 0..OVERLAYS {
        let _ = engine.mount(
            k,
            k + OVERLAYS,
            k + 2 * OVERLAYS,
            OverlayConfig::default().with_track_viewport(true),
        );
    }
    engine
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay_engine");

    // Sweep the pointer across every trigger, opening each after its hover delay.
    group.bench_function("hover_sweep", |b| {
        b.iter_batched(
            engine,
            |mut engine| {
                let mut now = Duration::ZERO;
                for k in 0..OVERLAYS {
                    black_box(engine.trigger(k, TriggerEvent::PointerEnter, now, &Grid));
                    now += Duration::from_millis(250);
                    black_box(engine.tick(now, &Grid));
                    black_box(engine.trigger(k, TriggerEvent::PointerLeave, now, &Grid));
                }
                engine
            },
            BatchSize::SmallInput,
        );
    });

    // Resize back and forth across the mobile breakpoint with one overlay locked.
    group.bench_function("resize_across_breakpoint", |b| {
        b.iter_batched(
            || {
                let mut engine = engine();
                let _ = engine.trigger(7, TriggerEvent::Click, Duration::ZERO, &Grid);
                engine
            },
            |mut engine| {
                for i in 0..64_u64 {
                    let size = if i % 2 == 0 {
                        Size::new(375.0, 667.0)
                    } else {
                        Size::new(1280.0, 800.0)
                    };
                    black_box(engine.resize(size, Duration::from_millis(i * 120), &Grid));
                }
                engine
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
