// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement resolution: candidate, flip, rank, shift.

use core::cmp::Ordering;

use kurbo::{Point, Rect, Size};

use crate::types::{Placement, PlacementOptions, Resolved, Strategy};

/// Resolve where a surface of size `overlay` goes next to `trigger`.
///
/// The candidate for `placement` centers the surface on the trigger's cross
/// axis and sits `options.offset` away along the main axis. A candidate is
/// accepted when it lies fully inside the viewport shrunk by
/// `options.padding` on every edge. Sides are tried in this order:
///
/// 1. the requested side,
/// 2. its [opposite](Placement::opposite),
/// 3. the remaining sides, most free space first (ties in
///    [`Placement::ALL`] order).
///
/// If none fits, the requested candidate is shifted into the padded viewport
/// on each axis independently. The surface is then never fully off-screen
/// but may no longer touch the trigger.
///
/// Inverted rectangles are normalized and negative sizes count as zero.
/// The function never panics and is deterministic.
pub fn resolve(
    trigger: Rect,
    overlay: Size,
    placement: Placement,
    viewport: Size,
    options: PlacementOptions,
) -> Resolved {
    let trigger = trigger.abs();
    let overlay = non_negative(overlay);
    let viewport = non_negative(viewport);
    let PlacementOptions { offset, padding } = options;

    let requested = candidate(trigger, overlay, placement, offset);
    if fits(requested, overlay, viewport, padding) {
        return Resolved {
            position: requested,
            placement,
            strategy: Strategy::Requested,
        };
    }

    let flipped = placement.opposite();
    let pos = candidate(trigger, overlay, flipped, offset);
    if fits(pos, overlay, viewport, padding) {
        return Resolved {
            position: pos,
            placement: flipped,
            strategy: Strategy::Flipped,
        };
    }

    for side in ranked_sides(trigger, viewport) {
        if side == placement || side == flipped {
            continue;
        }
        let pos = candidate(trigger, overlay, side, offset);
        if fits(pos, overlay, viewport, padding) {
            return Resolved {
                position: pos,
                placement: side,
                strategy: Strategy::Ranked,
            };
        }
    }

    Resolved {
        position: shift(requested, overlay, viewport, padding),
        placement,
        strategy: Strategy::Shifted,
    }
}

/// [`resolve`] with the default padding.
pub fn compute_position(
    trigger: Rect,
    overlay: Size,
    placement: Placement,
    offset: f64,
    viewport: Size,
) -> Resolved {
    resolve(
        trigger,
        overlay,
        placement,
        viewport,
        PlacementOptions {
            offset,
            ..PlacementOptions::default()
        },
    )
}

/// Free space between the trigger and the viewport edge on `side`.
///
/// May be negative when the trigger extends past that edge.
pub fn available_space(trigger: Rect, viewport: Size, side: Placement) -> f64 {
    let trigger = trigger.abs();
    match side {
        Placement::Top => trigger.y0,
        Placement::Bottom => viewport.height - trigger.y1,
        Placement::Left => trigger.x0,
        Placement::Right => viewport.width - trigger.x1,
    }
}

/// Top-left corner that centers `overlay` in the viewport.
///
/// Used for non-anchored presentation (for example on narrow touch screens).
/// The result is shifted into the padded viewport like the last step of
/// [`resolve`].
pub fn center_in_viewport(overlay: Size, viewport: Size, padding: f64) -> Point {
    let overlay = non_negative(overlay);
    let viewport = non_negative(viewport);
    let centered = Point::new(
        (viewport.width - overlay.width) / 2.0,
        (viewport.height - overlay.height) / 2.0,
    );
    shift(centered, overlay, viewport, padding)
}

fn non_negative(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}

fn candidate(trigger: Rect, overlay: Size, side: Placement, offset: f64) -> Point {
    let cx = trigger.x0 + (trigger.width() - overlay.width) / 2.0;
    let cy = trigger.y0 + (trigger.height() - overlay.height) / 2.0;
    match side {
        Placement::Top => Point::new(cx, trigger.y0 - overlay.height - offset),
        Placement::Bottom => Point::new(cx, trigger.y1 + offset),
        Placement::Left => Point::new(trigger.x0 - overlay.width - offset, cy),
        Placement::Right => Point::new(trigger.x1 + offset, cy),
    }
}

// NaN coordinates never fit.
fn fits(pos: Point, overlay: Size, viewport: Size, padding: f64) -> bool {
    pos.x >= padding
        && pos.y >= padding
        && pos.x + overlay.width <= viewport.width - padding
        && pos.y + overlay.height <= viewport.height - padding
}

fn ranked_sides(trigger: Rect, viewport: Size) -> [Placement; 4] {
    let mut sides = Placement::ALL;
    let rank = |p: &Placement| Placement::ALL.iter().position(|q| q == p).unwrap_or(0);
    sides.sort_unstable_by(|a, b| {
        let sa = available_space(trigger, viewport, *a);
        let sb = available_space(trigger, viewport, *b);
        sb.partial_cmp(&sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| rank(a).cmp(&rank(b)))
    });
    sides
}

// `min` then `max` so an oversized surface pins to the leading edge; also
// maps NaN to a bound instead of panicking like `f64::clamp`.
fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}

fn shift(pos: Point, overlay: Size, viewport: Size, padding: f64) -> Point {
    Point::new(
        clamp_axis(pos.x, padding, viewport.width - overlay.width - padding),
        clamp_axis(pos.y, padding, viewport.height - overlay.height - padding),
    )
}
