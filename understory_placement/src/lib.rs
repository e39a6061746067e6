// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_placement --heading-base-level=0

//! Understory Placement: Kurbo-native anchored placement for floating surfaces.
//!
//! Tooltips, popovers and toggletips all answer the same question: given the box of the element
//! that triggered them and their own size, where do they go so that they stay on screen?
//! This crate answers it with a single pure function, [`resolve`].
//!
//! ## Algorithm
//!
//! 1. Place the surface on the requested [`Placement`], centered on the trigger's cross axis and
//!    `offset` away along the main axis.
//! 2. If it collides with the padded viewport, flip to the [opposite](Placement::opposite) side.
//! 3. If that collides too, try the remaining sides, most free space first
//!    (see [`available_space`]).
//! 4. If nothing fits, shift the requested candidate into the viewport on each axis independently.
//!
//! The [`Resolved`] result carries the final side and the [`Strategy`] that produced it, so callers
//! can orient an arrow or note that the surface is detached from its trigger.
//!
//! ## Not a layout engine
//!
//! This crate does not measure anything.
//! Upstream code measures the trigger and the surface in viewport coordinates and passes plain
//! `kurbo` rectangles and sizes in. The result is deterministic: the same inputs always produce
//! bit-identical output, and degenerate inputs (empty, inverted, or negative boxes) still yield a
//! position instead of panicking.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_placement::{Placement, compute_position};
//!
//! let viewport = Size::new(1280.0, 800.0);
//! // A trigger hugging the top edge.
//! let trigger = Rect::from_origin_size((600.0, 10.0), (40.0, 20.0));
//! let tip = Size::new(200.0, 100.0);
//!
//! let r = compute_position(trigger, tip, Placement::Top, 8.0, viewport);
//! // No room above: flipped below the trigger.
//! assert_eq!(r.placement, Placement::Bottom);
//! assert_eq!(r.position.y, 38.0);
//! ```
//!
//! ## Configuration
//!
//! [`Placement`] implements [`FromStr`](core::str::FromStr). For names that come from
//! configuration, [`Placement::parse_or_default`] falls back to [`Placement::Top`] instead of
//! failing; with the `serde` feature, deserialization uses the same fallback.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(feature = "serde")]
extern crate alloc;

mod resolve;
mod types;

pub use resolve::{available_space, center_in_viewport, compute_position, resolve};
pub use types::{ParsePlacementError, Placement, PlacementOptions, Resolved, Strategy};
