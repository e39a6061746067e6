// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the overlay engine: states, modes, inputs, and effects.
//!
//! ## Overview
//!
//! These types describe what goes into an [`OverlayMachine`](crate::machine::OverlayMachine)
//! and what comes out of it. They are also shared by the [`dismiss`](crate::dismiss),
//! [`viewport`](crate::viewport) and [`host`](crate::host) modules.

use understory_placement::Resolved;

use crate::timer::TimerHandle;

/// Interaction state of one overlay.
///
/// `Open`, `Locked`, and `PendingClose` are "visually open": the surface is shown.
/// Only the [`OverlayMachine`](crate::machine::OverlayMachine) moves between states.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OverlayState {
    /// Not shown.
    #[default]
    Closed,
    /// Hover intent is pending; shown when the open timer fires.
    PendingOpen,
    /// Shown, following hover and focus.
    Open,
    /// Shown after an explicit activation; survives loss of hover and focus.
    Locked,
    /// Shown, about to close when the close timer fires.
    PendingClose,
}

impl OverlayState {
    /// True when the surface should be on screen.
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Open | Self::Locked | Self::PendingClose)
    }
}

/// Interaction mode derived from the viewport width.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ViewportMode {
    /// Pointer-capable layout: hover intent and anchored placement.
    #[default]
    Desktop,
    /// Touch layout: tap to toggle and centered placement.
    Mobile,
}

impl ViewportMode {
    /// Mode for a viewport `width` given a `breakpoint`.
    ///
    /// Widths strictly below the breakpoint are `Mobile`. There is no hysteresis.
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Which part of an overlay the pointer is over.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Part {
    /// The element that reveals the overlay.
    Trigger,
    /// The floating surface itself.
    Surface,
}

bitflags::bitflags! {
    /// Parts of an overlay currently under the pointer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HoverParts: u8 {
        /// Pointer is over the trigger.
        const TRIGGER = 0b0000_0001;
        /// Pointer is over the surface.
        const SURFACE = 0b0000_0010;
    }
}

impl From<Part> for HoverParts {
    fn from(part: Part) -> Self {
        match part {
            Part::Trigger => Self::TRIGGER,
            Part::Surface => Self::SURFACE,
        }
    }
}

/// An input to the interaction state machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// Pointer entered the trigger or the surface.
    HoverEnter(Part),
    /// Pointer left the trigger or the surface.
    HoverLeave(Part),
    /// Click or tap on the trigger. Toggles the lock.
    Activate,
    /// Trigger gained keyboard focus.
    Focus,
    /// Trigger lost keyboard focus.
    Blur,
    /// Escape was pressed.
    Escape,
    /// Pointer pressed outside both trigger and surface.
    OutsidePointerDown,
    /// Explicit close request, for example from a close button.
    Dismiss,
}

/// Why an overlay closed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CloseReason {
    /// The close timer fired.
    HideDelayElapsed,
    /// Activated again while locked.
    Toggled,
    /// Escape key.
    Escape,
    /// Pointer pressed outside.
    OutsidePointer,
    /// Close button or other explicit request.
    Dismissed,
    /// Trigger or surface could not be measured.
    Unmeasurable,
    /// The viewport switched to a mode without this state.
    ModeChanged,
    /// Engine disabled or the overlay was unmounted.
    Disabled,
    /// Another overlay took over.
    Superseded,
}

/// Side effect requested by the state machine.
///
/// Returned in order from every call that can change state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Effect {
    /// A deferred intent timer was armed.
    TimerStarted(TimerHandle),
    /// A previously armed timer was cancelled; its callback must not act.
    TimerCancelled(TimerHandle),
    /// The surface became visible.
    Opened {
        /// True when opened by an explicit activation.
        locked: bool,
    },
    /// An already visible surface became locked.
    Locked,
    /// The surface has a new position.
    Positioned(Resolved),
    /// The surface was hidden.
    Closed(CloseReason),
    /// Focus should move back to the trigger.
    RestoreFocus,
    /// Opening was skipped because the trigger or surface could not be measured.
    MeasurementFailed,
}

/// Keyboard key relevant to dismissal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Key {
    /// The Escape key.
    Escape,
    /// Any other key.
    Other,
}

bitflags::bitflags! {
    /// Global (window-level) listeners the host toolkit installs on behalf of the engine.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GlobalListeners: u8 {
        /// Pointer-down in the capture phase.
        const POINTER_DOWN = 0b0000_0001;
        /// Key-down, for Escape.
        const KEY_DOWN     = 0b0000_0010;
        /// Window resize.
        const RESIZE       = 0b0000_0100;
        /// Window or ancestor scroll.
        const SCROLL       = 0b0000_1000;
    }
}

/// Listeners to add and remove after a registration change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerChange {
    /// Listeners that must now be installed.
    pub install: GlobalListeners,
    /// Listeners that must now be removed.
    pub remove: GlobalListeners,
}

impl ListenerChange {
    /// Difference between the listener sets before and after a change.
    pub fn between(before: GlobalListeners, after: GlobalListeners) -> Self {
        Self {
            install: after - before,
            remove: before - after,
        }
    }

    /// True if nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.remove.is_empty()
    }
}
