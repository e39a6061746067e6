// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction state machine for a single overlay.
//!
//! ## States
//!
//! ```text
//!            hover-enter            timer
//!   Closed ──────────────▶ PendingOpen ─────▶ Open ◀──────────────┐
//!     ▲  ▲                     │ hover-leave   │ hover-leave/blur │ hover-enter/focus
//!     │  └─────────────────────┘               ▼                  │
//!     │◀───────────── timer ──────────── PendingClose ────────────┘
//!     │
//!     └──── activate / Escape / outside press / dismiss ──── Locked ◀── activate
//! ```
//!
//! Focus opens immediately, with no hover delay. An activation (click or tap)
//! locks the overlay open; a locked overlay ignores hover and blur and closes
//! only on a second activation, Escape, an outside press, or
//! [`Input::Dismiss`]. In [`ViewportMode::Mobile`] hover and focus are ignored
//! and activation toggles between `Closed` and `Locked`, with the surface
//! centered in the viewport.
//!
//! ## Timers
//!
//! The pending timer lives inside the `PendingOpen`/`PendingClose` state, so
//! at most one timer exists per overlay and arming one always replaces the
//! other. Every replaced timer is reported as [`Effect::TimerCancelled`]; a
//! host that scheduled a real callback for it must drop that callback, and
//! [`OverlayMachine::timer_fired`] ignores its token if it fires anyway.
//!
//! ## Measurement
//!
//! Whenever the overlay becomes visible it is positioned through a [`Measure`]
//! implementation. If the trigger is not mounted, has an empty box, or the
//! surface cannot be measured, the overlay stays closed and
//! [`Effect::MeasurementFailed`] is reported. This is not an error.
//!
//! ```
//! use core::time::Duration;
//! use kurbo::{Rect, Size};
//! use understory_overlay::config::OverlayConfig;
//! use understory_overlay::machine::{Measure, OverlayMachine};
//! use understory_overlay::types::{Input, OverlayState, Part};
//!
//! struct Boxes;
//! impl Measure for Boxes {
//!     fn trigger_bounds(&self) -> Option<Rect> { Some(Rect::new(600.0, 400.0, 640.0, 420.0)) }
//!     fn surface_size(&self) -> Option<Size> { Some(Size::new(200.0, 100.0)) }
//!     fn viewport(&self) -> Size { Size::new(1280.0, 800.0) }
//! }
//!
//! let ms = Duration::from_millis;
//! let mut m = OverlayMachine::new(OverlayConfig::default());
//! m.handle(Input::HoverEnter(Part::Trigger), ms(0), &Boxes);
//! assert_eq!(m.state(), OverlayState::PendingOpen);
//! m.tick(ms(200), &Boxes);
//! assert_eq!(m.state(), OverlayState::Open);
//! ```

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::{Point, Rect, Size};
use understory_placement::{Placement, Resolved, Strategy, center_in_viewport, resolve};

use crate::config::OverlayConfig;
use crate::timer::{TimerHandle, TimerKind, TimerSlot, TimerToken};
use crate::types::{CloseReason, Effect, HoverParts, Input, OverlayState, Part, ViewportMode};

/// Measurements of one overlay, taken by the host at the time of the call.
pub trait Measure {
    /// Trigger box in viewport coordinates, or `None` if not mounted.
    fn trigger_bounds(&self) -> Option<Rect>;
    /// Size of the surface content, or `None` if it cannot be measured.
    fn surface_size(&self) -> Option<Size>;
    /// Viewport size.
    fn viewport(&self) -> Size;
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Phase {
    Closed,
    PendingOpen(TimerHandle),
    Open,
    Locked,
    PendingClose(TimerHandle),
}

impl Phase {
    fn state(self) -> OverlayState {
        match self {
            Self::Closed => OverlayState::Closed,
            Self::PendingOpen(_) => OverlayState::PendingOpen,
            Self::Open => OverlayState::Open,
            Self::Locked => OverlayState::Locked,
            Self::PendingClose(_) => OverlayState::PendingClose,
        }
    }

    fn timer(self) -> Option<TimerHandle> {
        match self {
            Self::PendingOpen(h) | Self::PendingClose(h) => Some(h),
            _ => None,
        }
    }
}

/// Open/close/lock state of one overlay.
///
/// Create one per trigger when it mounts. Feed it [`Input`]s and call
/// [`tick`](Self::tick) (or [`timer_fired`](Self::timer_fired)) for timers.
/// Every call returns the [`Effect`]s it caused, in order.
#[derive(Clone, Debug)]
pub struct OverlayMachine {
    config: OverlayConfig,
    mode: ViewportMode,
    phase: Phase,
    hovered: HoverParts,
    resolved: Option<Resolved>,
    timers: TimerSlot,
}

impl OverlayMachine {
    /// Create a closed machine in desktop mode.
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            mode: ViewportMode::Desktop,
            phase: Phase::Closed,
            hovered: HoverParts::empty(),
            resolved: None,
            timers: TimerSlot::new(),
        }
    }

    /// Start in `mode` instead of desktop mode.
    pub fn with_mode(mut self, mode: ViewportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> OverlayState {
        self.phase.state()
    }

    /// Current viewport mode.
    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    /// True when the surface should be shown.
    pub fn is_open(&self) -> bool {
        self.state().is_visible()
    }

    /// True when locked by an explicit activation.
    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    /// Parts currently hovered.
    pub fn hovered(&self) -> HoverParts {
        self.hovered
    }

    /// Resolved placement while visible.
    pub fn resolved(&self) -> Option<Resolved> {
        self.resolved
    }

    /// Surface position while visible.
    pub fn position(&self) -> Option<Point> {
        self.resolved.map(|r| r.position)
    }

    /// Side in use while visible.
    pub fn placement(&self) -> Option<Placement> {
        self.resolved.map(|r| r.placement)
    }

    /// The live timer, if any.
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.phase.timer()
    }

    /// When the live timer is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.phase.timer().map(|h| h.due)
    }

    /// Handle one input at `now`.
    pub fn handle(&mut self, input: Input, now: Duration, measure: &impl Measure) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.config.disabled {
            return out;
        }
        let before = self.state();
        let mobile = self.mode == ViewportMode::Mobile;

        match input {
            Input::HoverEnter(part) => {
                self.hovered |= HoverParts::from(part);
                if !mobile {
                    self.hover_enter(part, now, &mut out);
                }
            }
            Input::HoverLeave(part) => {
                self.hovered -= HoverParts::from(part);
                if !mobile && self.hovered.is_empty() {
                    self.hover_leave(now, &mut out);
                }
            }
            Input::Activate => self.activate(measure, &mut out),
            Input::Focus if !mobile => match self.phase {
                Phase::Closed | Phase::PendingOpen(_) => {
                    self.cancel_timer(&mut out);
                    self.open(false, measure, &mut out);
                }
                Phase::PendingClose(_) => {
                    self.cancel_timer(&mut out);
                    self.phase = Phase::Open;
                }
                Phase::Open | Phase::Locked => {}
            },
            Input::Blur if !mobile => match self.phase {
                Phase::Open => self.arm(TimerKind::Close, now, &mut out),
                Phase::PendingOpen(_) if self.hovered.is_empty() => {
                    self.cancel_timer(&mut out);
                    self.phase = Phase::Closed;
                }
                _ => {}
            },
            Input::Focus | Input::Blur => {}
            Input::Escape if self.config.close_on_esc => {
                let was_open = self.is_open();
                self.close_into(CloseReason::Escape, &mut out);
                if was_open {
                    out.push(Effect::RestoreFocus);
                }
            }
            Input::OutsidePointerDown if self.config.close_on_click_outside => {
                self.close_into(CloseReason::OutsidePointer, &mut out);
            }
            Input::Escape | Input::OutsidePointerDown => {}
            Input::Dismiss => self.close_into(CloseReason::Dismissed, &mut out),
        }

        self.trace_transition(before, input);
        out
    }

    /// Fire the live timer if it is due at `now`.
    pub fn tick(&mut self, now: Duration, measure: &impl Measure) -> Vec<Effect> {
        match self.phase.timer() {
            Some(h) if h.is_due(now) => self.fire(h, measure),
            _ => Vec::new(),
        }
    }

    /// Report that the callback scheduled for `token` ran.
    ///
    /// Tokens of cancelled or already-fired timers are ignored.
    pub fn timer_fired(&mut self, token: TimerToken, measure: &impl Measure) -> Vec<Effect> {
        match self.phase.timer() {
            Some(h) if h.token == token => self.fire(h, measure),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::trace!(?token, "ignoring stale timer");
                Vec::new()
            }
        }
    }

    /// Recompute the position of a visible overlay.
    ///
    /// Emits [`Effect::Positioned`] only when the result changed. Closes the
    /// overlay if it can no longer be measured.
    pub fn reposition(&mut self, measure: &impl Measure) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.is_open() {
            self.reposition_into(measure, &mut out);
        }
        out
    }

    /// Switch viewport mode.
    ///
    /// Entering mobile mode closes hover-driven and pending states, which do not
    /// exist there. A locked overlay stays locked and is re-positioned.
    pub fn set_mode(&mut self, mode: ViewportMode, measure: &impl Measure) -> Vec<Effect> {
        let mut out = Vec::new();
        if mode == self.mode {
            return out;
        }
        self.mode = mode;
        match self.phase {
            Phase::Locked => self.reposition_into(measure, &mut out),
            Phase::Closed => {}
            _ if mode == ViewportMode::Mobile => {
                self.close_into(CloseReason::ModeChanged, &mut out);
            }
            Phase::Open | Phase::PendingClose(_) => self.reposition_into(measure, &mut out),
            Phase::PendingOpen(_) => {}
        }
        out
    }

    /// Enable or disable the overlay. Disabling cancels timers and closes it.
    pub fn set_disabled(&mut self, disabled: bool) -> Vec<Effect> {
        self.config.disabled = disabled;
        if disabled {
            self.hovered = HoverParts::empty();
            self.close(CloseReason::Disabled)
        } else {
            Vec::new()
        }
    }

    /// Close unconditionally, cancelling any timer.
    pub fn close(&mut self, reason: CloseReason) -> Vec<Effect> {
        let mut out = Vec::new();
        self.close_into(reason, &mut out);
        out
    }

    fn hover_enter(&mut self, part: Part, now: Duration, out: &mut Vec<Effect>) {
        match self.phase {
            Phase::Closed if part == Part::Trigger => self.arm(TimerKind::Open, now, out),
            Phase::PendingClose(_) => {
                self.cancel_timer(out);
                self.phase = Phase::Open;
            }
            _ => {}
        }
    }

    fn hover_leave(&mut self, now: Duration, out: &mut Vec<Effect>) {
        match self.phase {
            Phase::PendingOpen(_) => {
                self.cancel_timer(out);
                self.phase = Phase::Closed;
            }
            Phase::Open => self.arm(TimerKind::Close, now, out),
            _ => {}
        }
    }

    fn activate(&mut self, measure: &impl Measure, out: &mut Vec<Effect>) {
        match self.phase {
            Phase::Locked => self.close_into(CloseReason::Toggled, out),
            Phase::Open | Phase::PendingClose(_) => {
                self.cancel_timer(out);
                self.phase = Phase::Locked;
                out.push(Effect::Locked);
            }
            Phase::Closed | Phase::PendingOpen(_) => {
                self.cancel_timer(out);
                self.open(true, measure, out);
            }
        }
    }

    fn fire(&mut self, handle: TimerHandle, measure: &impl Measure) -> Vec<Effect> {
        let mut out = Vec::new();
        let before = self.state();
        match handle.kind {
            TimerKind::Open => {
                self.phase = Phase::Closed;
                self.open(false, measure, &mut out);
            }
            TimerKind::Close => {
                self.phase = Phase::Open;
                self.close_into(CloseReason::HideDelayElapsed, &mut out);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = ?handle.kind, from = ?before, to = ?self.state(), "timer fired");
        #[cfg(not(feature = "tracing"))]
        let _ = before;
        out
    }

    // Replaces the live timer, if any, so only one exists.
    fn arm(&mut self, kind: TimerKind, now: Duration, out: &mut Vec<Effect>) {
        self.cancel_timer(out);
        let delay = match kind {
            TimerKind::Open => self.config.hover_delay,
            TimerKind::Close => self.config.hide_delay,
        };
        let handle = self.timers.arm(kind, now, delay);
        self.phase = match kind {
            TimerKind::Open => Phase::PendingOpen(handle),
            TimerKind::Close => Phase::PendingClose(handle),
        };
        out.push(Effect::TimerStarted(handle));
    }

    // Reports the live timer as cancelled. The caller sets the next phase.
    fn cancel_timer(&mut self, out: &mut Vec<Effect>) {
        if let Some(h) = self.phase.timer() {
            out.push(Effect::TimerCancelled(h));
        }
    }

    fn open(&mut self, locked: bool, measure: &impl Measure, out: &mut Vec<Effect>) {
        let Some(resolved) = self.compute(measure) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(locked, "overlay not shown: trigger or surface unmeasurable");
            self.phase = Phase::Closed;
            self.resolved = None;
            out.push(Effect::MeasurementFailed);
            return;
        };
        self.phase = if locked { Phase::Locked } else { Phase::Open };
        self.resolved = Some(resolved);
        out.push(Effect::Opened { locked });
        out.push(Effect::Positioned(resolved));
    }

    fn close_into(&mut self, reason: CloseReason, out: &mut Vec<Effect>) {
        self.cancel_timer(out);
        let was_visible = self.is_open();
        self.phase = Phase::Closed;
        self.resolved = None;
        // A hidden surface never reports its pointer leaving.
        self.hovered -= HoverParts::SURFACE;
        if was_visible {
            out.push(Effect::Closed(reason));
        }
    }

    fn reposition_into(&mut self, measure: &impl Measure, out: &mut Vec<Effect>) {
        match self.compute(measure) {
            Some(r) => {
                if self.resolved != Some(r) {
                    self.resolved = Some(r);
                    out.push(Effect::Positioned(r));
                }
            }
            None => {
                self.close_into(CloseReason::Unmeasurable, out);
                out.push(Effect::MeasurementFailed);
            }
        }
    }

    fn compute(&self, measure: &impl Measure) -> Option<Resolved> {
        let trigger = measure.trigger_bounds()?.abs();
        let surface = measure.surface_size()?;
        let viewport = measure.viewport();
        match self.mode {
            ViewportMode::Desktop => {
                // Unmounted elements report an empty box.
                if !(trigger.width() > 0.0 || trigger.height() > 0.0) {
                    return None;
                }
                Some(resolve(
                    trigger,
                    surface,
                    self.config.placement,
                    viewport,
                    self.config.placement_options(),
                ))
            }
            ViewportMode::Mobile => Some(Resolved {
                position: center_in_viewport(surface, viewport, self.config.padding),
                placement: self.config.placement,
                strategy: Strategy::Centered,
            }),
        }
    }

    fn trace_transition(&self, before: OverlayState, input: Input) {
        #[cfg(feature = "tracing")]
        if before != self.state() {
            tracing::trace!(?input, from = ?before, to = ?self.state(), "overlay transition");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (before, input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    struct Boxes {
        trigger: Option<Rect>,
        surface: Option<Size>,
        viewport: Size,
    }

    impl Measure for Boxes {
        fn trigger_bounds(&self) -> Option<Rect> {
            self.trigger
        }
        fn surface_size(&self) -> Option<Size> {
            self.surface
        }
        fn viewport(&self) -> Size {
            self.viewport
        }
    }

    fn desktop() -> Boxes {
        Boxes {
            trigger: Some(Rect::from_origin_size((600.0, 400.0), (40.0, 20.0))),
            surface: Some(Size::new(200.0, 100.0)),
            viewport: Size::new(1280.0, 800.0),
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn machine() -> OverlayMachine {
        OverlayMachine::new(
            OverlayConfig::default()
                .with_hover_delay(ms(200))
                .with_hide_delay(ms(150)),
        )
    }

    #[test]
    fn hover_intent_opens_after_delay() {
        let b = desktop();
        let mut m = machine();
        let fx = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        assert!(matches!(fx[..], [Effect::TimerStarted(h)] if h.due == ms(200)));
        assert_eq!(m.next_deadline(), Some(ms(200)));
        assert!(m.tick(ms(199), &b).is_empty());
        assert_eq!(m.state(), OverlayState::PendingOpen);

        let fx = m.tick(ms(200), &b);
        assert_eq!(m.state(), OverlayState::Open);
        assert_eq!(fx[0], Effect::Opened { locked: false });
        assert_eq!(m.position(), Some(Point::new(520.0, 292.0)));
        assert_eq!(m.placement(), Some(Placement::Top));
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn quick_leave_never_opens() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let fx = m.handle(Input::HoverLeave(Part::Trigger), ms(150), &b);
        assert!(matches!(fx[..], [Effect::TimerCancelled(_)]));
        assert!(m.tick(ms(250), &b).is_empty());
        assert_eq!(m.state(), OverlayState::Closed);
    }

    #[test]
    fn rapid_alternation_keeps_only_last_intent() {
        let b = desktop();
        let mut m = machine();
        for t in (0..10).map(|i| i * 40) {
            let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(t), &b);
            let _ = m.handle(Input::HoverLeave(Part::Trigger), ms(t + 20), &b);
        }
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(400), &b);
        let _ = m.tick(ms(599), &b);
        assert_eq!(m.state(), OverlayState::PendingOpen);
        let _ = m.tick(ms(600), &b);
        assert_eq!(m.state(), OverlayState::Open);
    }

    #[test]
    fn pointer_can_travel_to_surface() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Focus, ms(0), &b);
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(10), &b);
        let _ = m.handle(Input::HoverLeave(Part::Trigger), ms(20), &b);
        assert_eq!(m.state(), OverlayState::PendingClose);
        let fx = m.handle(Input::HoverEnter(Part::Surface), ms(60), &b);
        assert!(matches!(fx[..], [Effect::TimerCancelled(h)] if h.kind == TimerKind::Close));
        assert_eq!(m.state(), OverlayState::Open);
        assert!(m.tick(ms(1000), &b).is_empty());
        assert_eq!(m.state(), OverlayState::Open);
    }

    #[test]
    fn overlapping_hover_parts_do_not_start_closing() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Focus, ms(0), &b);
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let _ = m.handle(Input::HoverEnter(Part::Surface), ms(10), &b);
        let fx = m.handle(Input::HoverLeave(Part::Trigger), ms(20), &b);
        assert!(fx.is_empty());
        assert_eq!(m.state(), OverlayState::Open);
    }

    #[test]
    fn hide_delay_closes() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let _ = m.tick(ms(200), &b);
        let _ = m.handle(Input::HoverLeave(Part::Trigger), ms(300), &b);
        let fx = m.tick(ms(450), &b);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::HideDelayElapsed)]);
        assert_eq!(m.state(), OverlayState::Closed);
        assert_eq!(m.position(), None);
    }

    #[test]
    fn focus_opens_immediately() {
        let b = desktop();
        let mut m = machine();
        let fx = m.handle(Input::Focus, ms(0), &b);
        assert_eq!(fx[0], Effect::Opened { locked: false });
        assert_eq!(m.state(), OverlayState::Open);

        let _ = m.handle(Input::Blur, ms(10), &b);
        assert_eq!(m.state(), OverlayState::PendingClose);
        let _ = m.handle(Input::Focus, ms(20), &b);
        assert_eq!(m.state(), OverlayState::Open);
    }

    #[test]
    fn focus_preempts_pending_hover() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let fx = m.handle(Input::Focus, ms(50), &b);
        assert!(matches!(fx[0], Effect::TimerCancelled(h) if h.kind == TimerKind::Open));
        assert_eq!(m.state(), OverlayState::Open);
        assert!(m.tick(ms(500), &b).is_empty());
    }

    #[test]
    fn lock_survives_hover_and_blur() {
        let b = desktop();
        let mut m = machine();
        let fx = m.handle(Input::Activate, ms(0), &b);
        assert_eq!(fx[0], Effect::Opened { locked: true });
        assert!(m.is_locked());

        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(5), &b);
        assert!(m.handle(Input::HoverLeave(Part::Trigger), ms(10), &b).is_empty());
        assert!(m.handle(Input::Blur, ms(20), &b).is_empty());
        assert!(m.tick(ms(10_000), &b).is_empty());
        assert_eq!(m.state(), OverlayState::Locked);

        let fx = m.handle(Input::Activate, ms(30), &b);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::Toggled)]);
        assert_eq!(m.state(), OverlayState::Closed);
    }

    #[test]
    fn activate_locks_open_overlay_in_place() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Focus, ms(0), &b);
        let _ = m.handle(Input::Blur, ms(10), &b);
        let fx = m.handle(Input::Activate, ms(20), &b);
        assert!(matches!(fx[..], [Effect::TimerCancelled(_), Effect::Locked]));
        assert!(m.is_locked());
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn escape_closes_and_restores_focus() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Activate, ms(0), &b);
        let fx = m.handle(Input::Escape, ms(10), &b);
        assert_eq!(
            fx,
            vec![Effect::Closed(CloseReason::Escape), Effect::RestoreFocus]
        );
        // Nothing to restore when nothing was shown.
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(20), &b);
        let fx = m.handle(Input::Escape, ms(30), &b);
        assert!(matches!(fx[..], [Effect::TimerCancelled(_)]));
        assert_eq!(m.state(), OverlayState::Closed);
    }

    #[test]
    fn outside_press_clears_lock() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Activate, ms(0), &b);
        let fx = m.handle(Input::OutsidePointerDown, ms(10), &b);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::OutsidePointer)]);
        assert!(!m.is_locked());
    }

    #[test]
    fn dismissal_opt_outs() {
        let b = desktop();
        let mut m = OverlayMachine::new(
            OverlayConfig::default()
                .with_close_on_esc(false)
                .with_close_on_click_outside(false),
        );
        let _ = m.handle(Input::Activate, ms(0), &b);
        assert!(m.handle(Input::Escape, ms(1), &b).is_empty());
        assert!(m.handle(Input::OutsidePointerDown, ms(2), &b).is_empty());
        let fx = m.handle(Input::Dismiss, ms(3), &b);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::Dismissed)]);
    }

    #[test]
    fn unmeasurable_trigger_stays_closed() {
        let mut b = desktop();
        b.trigger = None;
        let mut m = machine();
        let fx = m.handle(Input::Activate, ms(0), &b);
        assert_eq!(fx, vec![Effect::MeasurementFailed]);
        assert_eq!(m.state(), OverlayState::Closed);

        b.trigger = Some(Rect::ZERO);
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let fx = m.tick(ms(200), &b);
        assert_eq!(fx, vec![Effect::MeasurementFailed]);
        assert_eq!(m.state(), OverlayState::Closed);
        assert_eq!(m.position(), None);
    }

    #[test]
    fn reposition_closes_when_trigger_unmounts() {
        let mut b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Activate, ms(0), &b);
        assert!(m.reposition(&b).is_empty());

        b.trigger = Some(Rect::from_origin_size((600.0, 10.0), (40.0, 20.0)));
        let fx = m.reposition(&b);
        assert!(matches!(fx[..], [Effect::Positioned(r)] if r.placement == Placement::Bottom));

        b.trigger = None;
        let fx = m.reposition(&b);
        assert_eq!(
            fx,
            vec![
                Effect::Closed(CloseReason::Unmeasurable),
                Effect::MeasurementFailed
            ]
        );
    }

    #[test]
    fn mobile_tap_locks_centered() {
        let b = Boxes {
            trigger: Some(Rect::from_origin_size((10.0, 600.0), (30.0, 30.0))),
            surface: Some(Size::new(300.0, 200.0)),
            viewport: Size::new(375.0, 667.0),
        };
        let mut m = machine();
        let _ = m.set_mode(ViewportMode::Mobile, &b);
        assert!(m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b).is_empty());
        assert!(m.handle(Input::Focus, ms(0), &b).is_empty());
        assert!(m.tick(ms(1000), &b).is_empty());

        let _ = m.handle(Input::Activate, ms(1000), &b);
        assert_eq!(m.state(), OverlayState::Locked);
        let r = m.resolved().unwrap();
        assert_eq!(r.strategy, Strategy::Centered);
        assert_eq!(r.position, Point::new(37.5, 233.5));

        assert!(m.handle(Input::HoverLeave(Part::Trigger), ms(1010), &b).is_empty());
        let _ = m.handle(Input::Activate, ms(1020), &b);
        assert_eq!(m.state(), OverlayState::Closed);
    }

    #[test]
    fn entering_mobile_collapses_hover_states() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let fx = m.set_mode(ViewportMode::Mobile, &b);
        assert!(matches!(fx[..], [Effect::TimerCancelled(_)]));
        assert_eq!(m.state(), OverlayState::Closed);

        let _ = m.set_mode(ViewportMode::Desktop, &b);
        let _ = m.handle(Input::Focus, ms(0), &b);
        let fx = m.set_mode(ViewportMode::Mobile, &b);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::ModeChanged)]);
    }

    #[test]
    fn locked_overlay_survives_mode_change() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Activate, ms(0), &b);
        let fx = m.set_mode(ViewportMode::Mobile, &b);
        assert!(matches!(fx[..], [Effect::Positioned(r)] if r.strategy == Strategy::Centered));
        assert!(m.is_locked());
    }

    #[test]
    fn closing_forgets_surface_hover() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let _ = m.tick(ms(200), &b);
        let _ = m.handle(Input::HoverEnter(Part::Surface), ms(250), &b);
        let _ = m.handle(Input::HoverLeave(Part::Trigger), ms(260), &b);
        let _ = m.handle(Input::Escape, ms(300), &b);
        assert_eq!(m.state(), OverlayState::Closed);
        assert_eq!(m.hovered(), HoverParts::empty());

        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(400), &b);
        let _ = m.tick(ms(600), &b);
        assert_eq!(m.state(), OverlayState::Open);
        let fx = m.handle(Input::HoverLeave(Part::Trigger), ms(700), &b);
        assert!(matches!(fx[..], [Effect::TimerStarted(h)] if h.kind == TimerKind::Close));
        let _ = m.tick(ms(850), &b);
        assert_eq!(m.state(), OverlayState::Closed);
    }

    #[test]
    fn superseded_close_keeps_trigger_hover() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let _ = m.handle(Input::HoverEnter(Part::Surface), ms(10), &b);
        let _ = m.close(CloseReason::Superseded);
        assert_eq!(m.hovered(), HoverParts::TRIGGER);
    }

    #[test]
    fn stale_timer_tokens_are_ignored() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(0), &b);
        let first = m.pending_timer().unwrap();
        let _ = m.handle(Input::HoverLeave(Part::Trigger), ms(10), &b);
        let _ = m.handle(Input::HoverEnter(Part::Trigger), ms(20), &b);
        let second = m.pending_timer().unwrap();
        assert_ne!(first.token, second.token);

        assert!(m.timer_fired(first.token, &b).is_empty());
        assert_eq!(m.state(), OverlayState::PendingOpen);
        let fx = m.timer_fired(second.token, &b);
        assert_eq!(fx[0], Effect::Opened { locked: false });
        assert!(m.timer_fired(second.token, &b).is_empty());
    }

    #[test]
    fn disabled_ignores_input_and_closes() {
        let b = desktop();
        let mut m = machine();
        let _ = m.handle(Input::Activate, ms(0), &b);
        let fx = m.set_disabled(true);
        assert_eq!(fx, vec![Effect::Closed(CloseReason::Disabled)]);
        assert!(m.handle(Input::Activate, ms(1), &b).is_empty());
        assert!(m.handle(Input::Focus, ms(2), &b).is_empty());
        assert_eq!(m.state(), OverlayState::Closed);

        let _ = m.set_disabled(false);
        let _ = m.handle(Input::Activate, ms(3), &b);
        assert!(m.is_locked());
    }
}
