// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_overlay --heading-base-level=0

//! Understory Overlay: a deterministic, `no_std` interaction engine for anchored overlays.
//!
//! ## Overview
//!
//! Tooltips, popovers and toggletips share one set of behaviors: they open on hover intent or
//! keyboard focus, they can be locked open by a click or tap, they close on Escape and on presses
//! outside, they follow their trigger when the page scrolls, and on narrow screens they turn into
//! centered, tap-to-toggle surfaces above a backdrop.
//! This crate implements those behaviors as plain state, without a renderer, event loop, or clock.
//!
//! ## Pieces
//!
//! - [`machine::OverlayMachine`]: open/close/lock state of one overlay, with deferred hover intent.
//! - [`viewport::ViewportObserver`]: desktop/mobile mode per overlay from the viewport width.
//! - [`dismiss::DismissRegistry`]: outside-press and Escape dismissal across all visible overlays,
//!   with reference-counted global listeners.
//! - [`host::OverlayHost`]: a detached layer stack, with backdrops, for visible surfaces.
//! - [`engine::OverlayEngine`]: ties the above together for a whole page.
//!
//! Positions come from [`understory_placement`].
//!
//! ## Time
//!
//! Nothing here reads a clock. Every call that may start or fire a timer takes `now` as a
//! [`Duration`](core::time::Duration) since an arbitrary origin. Hosts either poll
//! [`tick`](engine::OverlayEngine::tick) at
//! [`next_deadline`](engine::OverlayEngine::next_deadline), or schedule a callback per
//! [`Effect::TimerStarted`](types::Effect::TimerStarted) and report it with
//! [`timer_fired`](engine::OverlayEngine::timer_fired). Callbacks for cancelled timers are ignored.
//!
//! ## Listeners
//!
//! Window-level listeners are described by [`GlobalListeners`](types::GlobalListeners). Each engine
//! call returns a [`ListenerChange`](types::ListenerChange) saying which listeners to install and
//! which to remove. A listener is installed once, however many overlays need it, and removed with
//! the last one.
//!
//! ## Features
//!
//! - `std` (default): enables `std` in `kurbo`.
//! - `libm`: `no_std` math for `kurbo`.
//! - `tracing`: emits `tracing` events for transitions, dismissals, and measurement failures.
//! - `serde`: `Serialize`/`Deserialize` for [`config::OverlayConfig`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod dismiss;
pub mod engine;
pub mod host;
pub mod machine;
pub mod timer;
pub mod types;
pub mod viewport;
