// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dismissal coordination: outside presses, Escape, and viewport tracking.
//!
//! ## Overview
//!
//! A single [`DismissRegistry`] serves the whole page. Each visible overlay is
//! registered with its trigger and surface keys. The registry reports which
//! window-level listeners the host must install ([`GlobalListeners`]); a
//! listener exists only while at least one registration needs it, and is
//! removed when the last such registration is deactivated.
//!
//! ## Outside presses
//!
//! The host feeds [`pointer_down`](DismissRegistry::pointer_down) the
//! root→target path of the pressed element, as produced by the toolkit's hit
//! test. A registration is
//! dismissed when neither its trigger nor its surface appears on that path.
//!
//! Hosts must call it from the earliest input hook they have (pointer-down in
//! the capture phase, not click). That way an overlay is dismissed before the
//! pressed element's own activation runs, and pressing another trigger closes
//! the old overlay and then opens the new one instead of reopening the old.
//!
//! ```
//! use understory_overlay::dismiss::{DismissReason, DismissRegistry, Registration};
//!
//! let mut reg: DismissRegistry<u32> = DismissRegistry::new();
//! // Overlay 10, triggered by node 3, rendering its surface as node 20.
//! let _ = reg.activate(Registration::new(10, 3, 20));
//!
//! // Press on node 5 (child of root 1): outside.
//! let out = reg.pointer_down(&[1, 5]);
//! assert_eq!(out[0].overlay, 10);
//! assert_eq!(out[0].reason, DismissReason::OutsidePointer);
//!
//! // Press inside the surface: nothing.
//! assert!(reg.pointer_down(&[20, 21]).is_empty());
//! ```

use alloc::vec::Vec;
use core::time::Duration;

use crate::timer::Throttle;
use crate::types::{GlobalListeners, Key, ListenerChange};

/// Whether several overlays may be registered at once.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Stacking {
    /// At most one overlay is active; activating another supersedes it.
    #[default]
    Exclusive,
    /// Overlays are independent (for example nested popovers).
    Independent,
}

/// One active overlay as seen by the registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Registration<K> {
    /// Overlay identity.
    pub overlay: K,
    /// Node of the trigger element.
    pub trigger: K,
    /// Node of the surface root.
    pub surface: K,
    /// Dismiss on Escape.
    pub close_on_esc: bool,
    /// Dismiss on outside presses.
    pub close_on_click_outside: bool,
    /// Report viewport changes for repositioning.
    pub track_viewport: bool,
}

impl<K> Registration<K> {
    /// A registration with Escape and outside-press dismissal and no viewport tracking.
    pub fn new(overlay: K, trigger: K, surface: K) -> Self {
        Self {
            overlay,
            trigger,
            surface,
            close_on_esc: true,
            close_on_click_outside: true,
            track_viewport: false,
        }
    }

    fn listeners(&self) -> GlobalListeners {
        let mut l = GlobalListeners::empty();
        l.set(GlobalListeners::POINTER_DOWN, self.close_on_click_outside);
        l.set(GlobalListeners::KEY_DOWN, self.close_on_esc);
        l.set(
            GlobalListeners::RESIZE | GlobalListeners::SCROLL,
            self.track_viewport,
        );
        l
    }
}

/// Why a registration was dismissed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DismissReason {
    /// Pointer pressed outside trigger and surface.
    OutsidePointer,
    /// Escape key.
    Escape,
}

/// A dismissal the host must deliver to an overlay.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Dismissal<K> {
    /// Overlay to close.
    pub overlay: K,
    /// What caused it.
    pub reason: DismissReason,
    /// Focus should return to the trigger.
    pub restore_focus: bool,
}

/// Result of [`DismissRegistry::activate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Activation<K> {
    /// Listener change for the host.
    pub listeners: ListenerChange,
    /// Overlays removed because [`Stacking::Exclusive`] allows only one.
    pub superseded: Vec<K>,
}

/// Process-wide registry of active overlays.
#[derive(Clone, Debug)]
pub struct DismissRegistry<K> {
    active: Vec<Registration<K>>,
    stacking: Stacking,
    throttle: Throttle,
}

impl<K: Copy + Eq> Default for DismissRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq> DismissRegistry<K> {
    /// Create an exclusive registry with the default repositioning throttle.
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            stacking: Stacking::Exclusive,
            throttle: Throttle::default(),
        }
    }

    /// Set the stacking policy.
    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = stacking;
        self
    }

    /// Set the minimum interval between repositioning rounds.
    pub fn with_reposition_interval(mut self, interval: Duration) -> Self {
        self.throttle = Throttle::new(interval);
        self
    }

    /// Stacking policy.
    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    /// True if `overlay` is registered.
    pub fn is_active(&self, overlay: &K) -> bool {
        self.active.iter().any(|r| r.overlay == *overlay)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Listeners needed by the current registrations.
    pub fn listeners(&self) -> GlobalListeners {
        self.active
            .iter()
            .fold(GlobalListeners::empty(), |acc, r| acc | r.listeners())
    }

    /// Register an overlay, replacing its previous registration if any.
    ///
    /// The newest registration is the topmost.
    pub fn activate(&mut self, registration: Registration<K>) -> Activation<K> {
        let before = self.listeners();
        let overlay = registration.overlay;
        self.active.retain(|r| r.overlay != overlay);

        let mut superseded = Vec::new();
        if self.stacking == Stacking::Exclusive {
            superseded.extend(self.active.drain(..).map(|r| r.overlay));
        }
        self.active.push(registration);
        self.settle_throttle();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            active = self.active.len(),
            superseded = superseded.len(),
            "overlay registered"
        );
        Activation {
            listeners: ListenerChange::between(before, self.listeners()),
            superseded,
        }
    }

    /// Remove an overlay's registration. Unknown overlays are ignored.
    pub fn deactivate(&mut self, overlay: &K) -> ListenerChange {
        let before = self.listeners();
        self.active.retain(|r| r.overlay != *overlay);
        self.settle_throttle();
        ListenerChange::between(before, self.listeners())
    }

    /// Overlays to dismiss for a pointer press on `target_path` (root→target).
    ///
    /// Topmost first. Registrations stay in place until deactivated.
    pub fn pointer_down(&self, target_path: &[K]) -> Vec<Dismissal<K>> {
        let out: Vec<_> = self
            .active
            .iter()
            .rev()
            .filter(|r| r.close_on_click_outside)
            .filter(|r| !target_path.contains(&r.trigger) && !target_path.contains(&r.surface))
            .map(|r| Dismissal {
                overlay: r.overlay,
                reason: DismissReason::OutsidePointer,
                restore_focus: false,
            })
            .collect();
        #[cfg(feature = "tracing")]
        if !out.is_empty() {
            tracing::debug!(count = out.len(), "outside press dismisses overlays");
        }
        out
    }

    /// Overlays to dismiss for a key press. Topmost first.
    pub fn key_down(&self, key: Key) -> Vec<Dismissal<K>> {
        if key != Key::Escape {
            return Vec::new();
        }
        self.active
            .iter()
            .rev()
            .filter(|r| r.close_on_esc)
            .map(|r| Dismissal {
                overlay: r.overlay,
                reason: DismissReason::Escape,
                restore_focus: true,
            })
            .collect()
    }

    /// Overlays to reposition after a resize or scroll at `now`.
    ///
    /// Empty when no registration tracks the viewport or when the previous
    /// round was less than the throttle interval ago.
    pub fn viewport_changed(&mut self, now: Duration) -> Vec<K> {
        if !self.active.iter().any(|r| r.track_viewport) || !self.throttle.try_acquire(now) {
            return Vec::new();
        }
        self.active
            .iter()
            .filter(|r| r.track_viewport)
            .map(|r| r.overlay)
            .collect()
    }

    fn settle_throttle(&mut self) {
        if !self.active.iter().any(|r| r.track_viewport) {
            self.throttle.reset();
        }
    }
}
