// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchored placement near each viewport edge.
//!
//! Prints where a 200×100 surface lands for triggers hugging each edge, and
//! which strategy (requested, flipped, ranked, shifted) produced the result.
//!
//! Run:
//! - `cargo run -p understory_demos --example placement_basics`

use kurbo::{Rect, Size};
use understory_placement::{Placement, PlacementOptions, resolve};

fn main() {
    let viewport = Size::new(1280.0, 800.0);
    let surface = Size::new(200.0, 100.0);
    let options = PlacementOptions::default();

    let triggers = [
        ("center", Rect::from_origin_size((620.0, 390.0), (40.0, 20.0))),
        ("top edge", Rect::from_origin_size((600.0, 10.0), (40.0, 20.0))),
        ("right edge", Rect::from_origin_size((1250.0, 400.0), (20.0, 20.0))),
        ("top-left corner", Rect::from_origin_size((2.0, 2.0), (20.0, 20.0))),
    ];

    for (name, trigger) in triggers {
        for requested in Placement::ALL {
            let r = resolve(trigger, surface, requested, viewport, options);
            println!(
                "{name:>16} {requested:>6} -> {:>6} at ({:>6.1}, {:>6.1}) [{:?}]",
                r.placement, r.position.x, r.position.y, r.strategy
            );
        }
    }

    // Placement names from configuration fall back to `top`.
    for name in ["Bottom", " left ", "diagonal"] {
        println!("{name:?} -> {}", Placement::parse_or_default(name));
    }
}
