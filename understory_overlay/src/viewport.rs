// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport mode observation with fan-out to many overlays.
//!
//! One [`ViewportObserver`] serves every overlay on the page. The host installs
//! a single resize listener while at least one overlay is subscribed (see the
//! [`ListenerChange`] returned by [`subscribe`](ViewportObserver::subscribe) and
//! [`unsubscribe`](ViewportObserver::unsubscribe)) and forwards each resize to
//! [`set_viewport`](ViewportObserver::set_viewport), which reports the overlays
//! whose mode flipped.
//!
//! ```
//! use kurbo::Size;
//! use understory_overlay::types::ViewportMode;
//! use understory_overlay::viewport::ViewportObserver;
//!
//! let mut vp: ViewportObserver<u32> = ViewportObserver::new(Size::new(1280.0, 800.0));
//! let (mode, _) = vp.subscribe(1, 1024.0);
//! assert_eq!(mode, ViewportMode::Desktop);
//!
//! let flips = vp.set_viewport(Size::new(375.0, 667.0));
//! assert_eq!(flips, vec![(1, ViewportMode::Mobile)]);
//! ```

use alloc::vec::Vec;

use kurbo::Size;

use crate::types::{GlobalListeners, ListenerChange, ViewportMode};

#[derive(Clone, Debug)]
struct Subscriber<K> {
    key: K,
    breakpoint: f64,
    mode: ViewportMode,
}

/// Tracks the viewport size and each subscriber's [`ViewportMode`].
#[derive(Clone, Debug)]
pub struct ViewportObserver<K> {
    size: Size,
    subscribers: Vec<Subscriber<K>>,
}

impl<K: Copy + Eq> ViewportObserver<K> {
    /// Create an observer for a viewport of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            subscribers: Vec::new(),
        }
    }

    /// Current viewport size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Current mode of a subscriber.
    pub fn mode_of(&self, key: &K) -> Option<ViewportMode> {
        self.subscribers
            .iter()
            .find(|s| s.key == *key)
            .map(|s| s.mode)
    }

    /// Mode the current viewport would have for `breakpoint`.
    pub fn mode_at(&self, breakpoint: f64) -> ViewportMode {
        ViewportMode::for_width(self.size.width, breakpoint)
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Listeners needed for the current subscribers.
    pub fn listeners(&self) -> GlobalListeners {
        if self.subscribers.is_empty() {
            GlobalListeners::empty()
        } else {
            GlobalListeners::RESIZE
        }
    }

    /// Subscribe `key` with its own breakpoint, replacing any previous entry.
    ///
    /// Returns the subscriber's current mode and the listener change.
    pub fn subscribe(&mut self, key: K, breakpoint: f64) -> (ViewportMode, ListenerChange) {
        let before = self.listeners();
        let mode = self.mode_at(breakpoint);
        if let Some(s) = self.subscribers.iter_mut().find(|s| s.key == key) {
            s.breakpoint = breakpoint;
            s.mode = mode;
        } else {
            self.subscribers.push(Subscriber {
                key,
                breakpoint,
                mode,
            });
        }
        (mode, ListenerChange::between(before, self.listeners()))
    }

    /// Remove `key`. Unknown keys are ignored.
    pub fn unsubscribe(&mut self, key: &K) -> ListenerChange {
        let before = self.listeners();
        self.subscribers.retain(|s| s.key != *key);
        ListenerChange::between(before, self.listeners())
    }

    /// Record a new viewport size.
    ///
    /// Returns the subscribers whose mode changed, with their new mode, in
    /// subscription order.
    pub fn set_viewport(&mut self, size: Size) -> Vec<(K, ViewportMode)> {
        self.size = size;
        let mut flipped = Vec::new();
        for s in &mut self.subscribers {
            let mode = ViewportMode::for_width(size.width, s.breakpoint);
            if mode != s.mode {
                s.mode = mode;
                flipped.push((s.key, mode));
            }
        }
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn one_listener_for_many_subscribers() {
        let mut vp: ViewportObserver<u32> = ViewportObserver::new(Size::new(1280.0, 800.0));
        let (_, first) = vp.subscribe(1, 1024.0);
        assert_eq!(first.install, GlobalListeners::RESIZE);
        let (_, second) = vp.subscribe(2, 1024.0);
        assert!(second.is_empty(), "second subscriber must not add a listener");

        assert!(vp.unsubscribe(&1).is_empty());
        let last = vp.unsubscribe(&2);
        assert_eq!(last.remove, GlobalListeners::RESIZE);
        assert!(vp.is_empty());
    }

    #[test]
    fn fans_out_only_flipped_subscribers() {
        let mut vp: ViewportObserver<u32> = ViewportObserver::new(Size::new(1280.0, 800.0));
        let _ = vp.subscribe(1, 1024.0);
        let _ = vp.subscribe(2, 600.0);
        assert_eq!(
            vp.set_viewport(Size::new(800.0, 800.0)),
            vec![(1, ViewportMode::Mobile)]
        );
        assert_eq!(
            vp.set_viewport(Size::new(375.0, 800.0)),
            vec![(2, ViewportMode::Mobile)]
        );
        assert!(vp.set_viewport(Size::new(380.0, 800.0)).is_empty());
        assert_eq!(
            vp.set_viewport(Size::new(1024.0, 800.0)),
            vec![(1, ViewportMode::Desktop), (2, ViewportMode::Desktop)]
        );
    }

    #[test]
    fn resubscribe_replaces_breakpoint() {
        let mut vp: ViewportObserver<u32> = ViewportObserver::new(Size::new(800.0, 600.0));
        let (m, _) = vp.subscribe(7, 1024.0);
        assert_eq!(m, ViewportMode::Mobile);
        let (m, change) = vp.subscribe(7, 640.0);
        assert_eq!(m, ViewportMode::Desktop);
        assert!(change.is_empty());
        assert_eq!(vp.len(), 1);
        assert_eq!(vp.mode_of(&7), Some(ViewportMode::Desktop));
    }
}
