// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine: many overlays, one set of global listeners.
//!
//! ## Overview
//!
//! [`OverlayEngine`] owns one [`OverlayMachine`] per mounted overlay and the
//! shared pieces they need: the [`ViewportObserver`], the [`DismissRegistry`],
//! and the [`OverlayHost`]. Callers route toolkit input to it and read back an
//! [`OverlayView`] per overlay plus an [`EngineOutput`] per call.
//!
//! After every call the engine reconciles state with the shared pieces: a
//! visible overlay is registered for dismissal and shown in the host, a closed
//! one is deregistered and hidden. Listener bookkeeping therefore follows the
//! state machine and never depends on callers remembering a cleanup step.
//!
//! ## Keys
//!
//! One key type `K` names overlays as well as the trigger and surface nodes,
//! the same node keys the toolkit uses for hit testing. This lets
//! [`pointer_down`](OverlayEngine::pointer_down) take the pressed element's
//! root→target path directly.
//!
//! ## One overlay at a time
//!
//! With the default [`Stacking::Exclusive`], an overlay becoming visible closes
//! any other visible overlay with [`CloseReason::Superseded`]. Use
//! [`OverlayEngine::with_stacking`] to allow independent overlays.
//!
//! ```
//! use core::time::Duration;
//! use kurbo::{Rect, Size};
//! use understory_overlay::config::OverlayConfig;
//! use understory_overlay::engine::{MeasureOverlays, OverlayEngine, TriggerEvent};
//!
//! struct Page;
//! impl MeasureOverlays<u32> for Page {
//!     fn trigger_bounds(&self, _: &u32) -> Option<Rect> {
//!         Some(Rect::new(600.0, 10.0, 640.0, 30.0))
//!     }
//!     fn surface_size(&self, _: &u32) -> Option<Size> { Some(Size::new(200.0, 100.0)) }
//! }
//!
//! let now = Duration::ZERO;
//! let mut engine: OverlayEngine<u32> = OverlayEngine::new(Size::new(1280.0, 800.0));
//! engine.mount(1, 10, 20, OverlayConfig::default()).unwrap();
//!
//! let out = engine.trigger(1, TriggerEvent::Click, now, &Page);
//! assert!(!out.listeners.install.is_empty());
//!
//! let view = engine.view(&1).unwrap();
//! assert!(view.is_locked);
//! assert_eq!(view.position.unwrap().y, 38.0);
//! ```

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::{Point, Rect, Size};
use understory_placement::Placement;

use crate::config::OverlayConfig;
use crate::dismiss::{DismissRegistry, Registration, Stacking};
use crate::host::{LayerChange, OverlayHost};
use crate::machine::{Measure, OverlayMachine};
use crate::timer::TimerToken;
use crate::types::{
    CloseReason, Effect, GlobalListeners, Input, Key, ListenerChange, OverlayState, Part,
    ViewportMode,
};
use crate::viewport::ViewportObserver;

/// Errors from mounting and unmounting overlays.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OverlayError {
    /// The overlay key is already in use.
    #[error("overlay is already mounted")]
    AlreadyMounted,
    /// No overlay with this key is mounted.
    #[error("overlay is not mounted")]
    NotMounted,
}

/// Measurements for every mounted overlay, taken by the host toolkit.
pub trait MeasureOverlays<K> {
    /// Trigger box of `overlay` in viewport coordinates, or `None` if not mounted.
    fn trigger_bounds(&self, overlay: &K) -> Option<Rect>;
    /// Size of the surface content of `overlay`, or `None` if it cannot be measured.
    fn surface_size(&self, overlay: &K) -> Option<Size>;
}

struct Scoped<'a, K, M: ?Sized> {
    overlay: K,
    inner: &'a M,
    viewport: Size,
}

impl<K, M: MeasureOverlays<K> + ?Sized> Measure for Scoped<'_, K, M> {
    fn trigger_bounds(&self) -> Option<Rect> {
        self.inner.trigger_bounds(&self.overlay)
    }

    fn surface_size(&self) -> Option<Size> {
        self.inner.surface_size(&self.overlay)
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

/// Toolkit events on a trigger element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TriggerEvent {
    /// Pointer entered.
    PointerEnter,
    /// Pointer left.
    PointerLeave,
    /// Click, tap, or keyboard activation.
    Click,
    /// Keyboard focus gained.
    Focus,
    /// Keyboard focus lost.
    Blur,
}

impl From<TriggerEvent> for Input {
    fn from(ev: TriggerEvent) -> Self {
        match ev {
            TriggerEvent::PointerEnter => Self::HoverEnter(Part::Trigger),
            TriggerEvent::PointerLeave => Self::HoverLeave(Part::Trigger),
            TriggerEvent::Click => Self::Activate,
            TriggerEvent::Focus => Self::Focus,
            TriggerEvent::Blur => Self::Blur,
        }
    }
}

/// Toolkit events on a surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SurfaceEvent {
    /// Pointer entered.
    PointerEnter,
    /// Pointer left.
    PointerLeave,
    /// The surface's close button was pressed.
    CloseButton,
}

impl From<SurfaceEvent> for Input {
    fn from(ev: SurfaceEvent) -> Self {
        match ev {
            SurfaceEvent::PointerEnter => Self::HoverEnter(Part::Surface),
            SurfaceEvent::PointerLeave => Self::HoverLeave(Part::Surface),
            SurfaceEvent::CloseButton => Self::Dismiss,
        }
    }
}

/// What a caller needs to render one overlay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayView {
    /// Interaction state.
    pub state: OverlayState,
    /// The surface should be shown.
    pub is_open: bool,
    /// Opened by an explicit activation.
    pub is_locked: bool,
    /// Surface top-left while shown.
    pub position: Option<Point>,
    /// Side in use while shown.
    pub placement: Option<Placement>,
    /// Current viewport mode for this overlay.
    pub mode: ViewportMode,
}

/// Everything the host toolkit must act on after one engine call.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOutput<K> {
    /// Global listeners to install and remove.
    pub listeners: ListenerChange,
    /// Layer stack changes to render.
    pub layers: Vec<LayerChange<K>>,
    /// Overlays whose trigger should get focus back.
    pub restore_focus: Vec<K>,
    /// Every state machine effect, tagged with its overlay.
    pub effects: Vec<(K, Effect)>,
}

impl<K> Default for EngineOutput<K> {
    fn default() -> Self {
        Self {
            listeners: ListenerChange::default(),
            layers: Vec::new(),
            restore_focus: Vec::new(),
            effects: Vec::new(),
        }
    }
}

impl<K> EngineOutput<K> {
    /// True if the call changed nothing.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
            && self.layers.is_empty()
            && self.restore_focus.is_empty()
            && self.effects.is_empty()
    }
}

#[derive(Clone, Debug)]
struct Entry<K> {
    overlay: K,
    trigger: K,
    surface: K,
    machine: OverlayMachine,
}

/// Coordinator for all overlays on a page.
#[derive(Clone, Debug)]
pub struct OverlayEngine<K> {
    entries: Vec<Entry<K>>,
    viewport: ViewportObserver<K>,
    dismiss: DismissRegistry<K>,
    host: OverlayHost<K>,
}

impl<K: Copy + Eq + core::fmt::Debug> OverlayEngine<K> {
    /// Create an engine for a viewport of the given size.
    pub fn new(viewport: Size) -> Self {
        Self {
            entries: Vec::new(),
            viewport: ViewportObserver::new(viewport),
            dismiss: DismissRegistry::new(),
            host: OverlayHost::new(viewport),
        }
    }

    /// Set the stacking policy. Call before mounting overlays.
    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.dismiss = self.dismiss.with_stacking(stacking);
        self
    }

    /// Set the minimum interval between repositioning rounds on resize and scroll.
    pub fn with_reposition_interval(mut self, interval: Duration) -> Self {
        self.dismiss = self.dismiss.with_reposition_interval(interval);
        self
    }

    /// Layer stack of visible overlays.
    pub fn host(&self) -> &OverlayHost<K> {
        &self.host
    }

    /// Global listeners the toolkit should currently have installed.
    pub fn listeners(&self) -> GlobalListeners {
        self.dismiss.listeners() | self.viewport.listeners()
    }

    /// Current viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport.size()
    }

    /// Number of mounted overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no overlay is mounted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// State machine of `overlay`.
    pub fn machine(&self, overlay: &K) -> Option<&OverlayMachine> {
        self.index_of(overlay).map(|i| &self.entries[i].machine)
    }

    /// Render state of `overlay`.
    pub fn view(&self, overlay: &K) -> Option<OverlayView> {
        let m = self.machine(overlay)?;
        Some(OverlayView {
            state: m.state(),
            is_open: m.is_open(),
            is_locked: m.is_locked(),
            position: m.position(),
            placement: m.placement(),
            mode: m.mode(),
        })
    }

    /// Earliest pending timer across all overlays.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries
            .iter()
            .filter_map(|e| e.machine.next_deadline())
            .min()
    }

    /// Mount an overlay whose trigger node is `trigger` and whose surface root is `surface`.
    pub fn mount(
        &mut self,
        overlay: K,
        trigger: K,
        surface: K,
        config: OverlayConfig,
    ) -> Result<EngineOutput<K>, OverlayError> {
        if self.index_of(&overlay).is_some() {
            return Err(OverlayError::AlreadyMounted);
        }
        let before = self.listeners();
        let (mode, _) = self.viewport.subscribe(overlay, config.mobile_breakpoint);
        self.entries.push(Entry {
            overlay,
            trigger,
            surface,
            machine: OverlayMachine::new(config).with_mode(mode),
        });
        #[cfg(feature = "tracing")]
        tracing::debug!(?overlay, ?mode, "overlay mounted");
        Ok(EngineOutput {
            listeners: ListenerChange::between(before, self.listeners()),
            ..EngineOutput::default()
        })
    }

    /// Unmount an overlay: cancel its timers, deregister it, and remove its layers.
    pub fn unmount(&mut self, overlay: &K) -> Result<EngineOutput<K>, OverlayError> {
        let i = self.index_of(overlay).ok_or(OverlayError::NotMounted)?;
        let before = self.listeners();
        let mut out = EngineOutput::default();
        let fx = self.entries[i].machine.close(CloseReason::Disabled);
        record(&mut out, *overlay, fx);
        let _ = self.dismiss.deactivate(overlay);
        let _ = self.viewport.unsubscribe(overlay);
        out.layers.extend(self.host.hide(overlay));
        self.entries.remove(i);
        #[cfg(feature = "tracing")]
        tracing::debug!(?overlay, "overlay unmounted");
        out.listeners = ListenerChange::between(before, self.listeners());
        Ok(out)
    }

    /// Unmount every overlay. All listeners end up removed.
    pub fn unmount_all(&mut self) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        let keys: Vec<K> = self.entries.iter().map(|e| e.overlay).collect();
        for k in keys {
            if let Ok(o) = self.unmount(&k) {
                out.layers.extend(o.layers);
                out.effects.extend(o.effects);
            }
        }
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Enable or disable an overlay.
    pub fn set_disabled(
        &mut self,
        overlay: &K,
        disabled: bool,
    ) -> Result<EngineOutput<K>, OverlayError> {
        let i = self.index_of(overlay).ok_or(OverlayError::NotMounted)?;
        let before = self.listeners();
        let mut out = EngineOutput::default();
        let fx = self.entries[i].machine.set_disabled(disabled);
        record(&mut out, *overlay, fx);
        self.settle(*overlay, None, &mut out);
        out.listeners = ListenerChange::between(before, self.listeners());
        Ok(out)
    }

    /// Route an event on `overlay`'s trigger.
    pub fn trigger<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        overlay: K,
        event: TriggerEvent,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        self.input(overlay, event.into(), now, measure)
    }

    /// Route an event on `overlay`'s surface.
    pub fn surface<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        overlay: K,
        event: SurfaceEvent,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        self.input(overlay, event.into(), now, measure)
    }

    /// Route a pointer press, given the pressed element's root→target path.
    ///
    /// Call this before routing the press to the pressed element itself.
    /// A press on a pickable backdrop is outside: pass the backdrop's path,
    /// or an empty path.
    pub fn pointer_down<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        target_path: &[K],
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        for d in self.dismiss.pointer_down(target_path) {
            self.apply(d.overlay, Input::OutsidePointerDown, now, measure, &mut out);
        }
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Route a key press.
    pub fn key_down<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        key: Key,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        for d in self.dismiss.key_down(key) {
            self.apply(d.overlay, Input::Escape, now, measure, &mut out);
        }
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Route a viewport resize.
    ///
    /// Updates every overlay's mode, re-centers visible overlays in mobile
    /// mode, then repositions overlays that track the viewport (subject to the
    /// repositioning throttle).
    pub fn resize<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        size: Size,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        out.layers.extend(self.host.set_viewport(size));
        for (overlay, mode) in self.viewport.set_viewport(size) {
            let Some(i) = self.index_of(&overlay) else {
                continue;
            };
            let scoped = Scoped {
                overlay,
                inner: measure,
                viewport: size,
            };
            let fx = self.entries[i].machine.set_mode(mode, &scoped);
            record(&mut out, overlay, fx);
            self.settle(overlay, measure.surface_size(&overlay), &mut out);
        }
        // Centered surfaces depend only on the viewport.
        let centered: Vec<K> = self
            .entries
            .iter()
            .filter(|e| e.machine.is_open() && e.machine.mode() == ViewportMode::Mobile)
            .map(|e| e.overlay)
            .collect();
        for overlay in centered {
            let Some(i) = self.index_of(&overlay) else {
                continue;
            };
            let scoped = Scoped {
                overlay,
                inner: measure,
                viewport: size,
            };
            let fx = self.entries[i].machine.reposition(&scoped);
            record(&mut out, overlay, fx);
            self.settle(overlay, measure.surface_size(&overlay), &mut out);
        }
        self.reposition_tracked(now, measure, &mut out);
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Route a scroll of the window or an ancestor of a trigger.
    pub fn scroll<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        self.reposition_tracked(now, measure, &mut out);
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Fire every timer due at `now`.
    pub fn tick<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        let viewport = self.viewport.size();
        let due: Vec<K> = self
            .entries
            .iter()
            .filter(|e| e.machine.next_deadline().is_some_and(|d| d <= now))
            .map(|e| e.overlay)
            .collect();
        for overlay in due {
            let Some(i) = self.index_of(&overlay) else {
                continue;
            };
            let scoped = Scoped {
                overlay,
                inner: measure,
                viewport,
            };
            let fx = self.entries[i].machine.tick(now, &scoped);
            record(&mut out, overlay, fx);
            self.settle(overlay, measure.surface_size(&overlay), &mut out);
        }
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    /// Report that the callback scheduled for `token` on `overlay` ran.
    pub fn timer_fired<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        overlay: K,
        token: TimerToken,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        if let Some(i) = self.index_of(&overlay) {
            let scoped = Scoped {
                overlay,
                inner: measure,
                viewport: self.viewport.size(),
            };
            let fx = self.entries[i].machine.timer_fired(token, &scoped);
            record(&mut out, overlay, fx);
            self.settle(overlay, measure.surface_size(&overlay), &mut out);
        }
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    fn input<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        overlay: K,
        input: Input,
        now: Duration,
        measure: &M,
    ) -> EngineOutput<K> {
        let before = self.listeners();
        let mut out = EngineOutput::default();
        self.apply(overlay, input, now, measure, &mut out);
        out.listeners = ListenerChange::between(before, self.listeners());
        out
    }

    fn apply<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        overlay: K,
        input: Input,
        now: Duration,
        measure: &M,
        out: &mut EngineOutput<K>,
    ) {
        let Some(i) = self.index_of(&overlay) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(?overlay, ?input, "input for unmounted overlay");
            return;
        };
        let scoped = Scoped {
            overlay,
            inner: measure,
            viewport: self.viewport.size(),
        };
        let fx = self.entries[i].machine.handle(input, now, &scoped);
        record(out, overlay, fx);
        self.settle(overlay, measure.surface_size(&overlay), out);
    }

    fn reposition_tracked<M: MeasureOverlays<K> + ?Sized>(
        &mut self,
        now: Duration,
        measure: &M,
        out: &mut EngineOutput<K>,
    ) {
        let viewport = self.viewport.size();
        for overlay in self.dismiss.viewport_changed(now) {
            let Some(i) = self.index_of(&overlay) else {
                continue;
            };
            let scoped = Scoped {
                overlay,
                inner: measure,
                viewport,
            };
            let fx = self.entries[i].machine.reposition(&scoped);
            record(out, overlay, fx);
            self.settle(overlay, measure.surface_size(&overlay), out);
        }
    }

    // Bring the registry and host in line with the machine's state.
    fn settle(&mut self, overlay: K, surface: Option<Size>, out: &mut EngineOutput<K>) {
        let Some(i) = self.index_of(&overlay) else {
            return;
        };
        let entry = &self.entries[i];
        let machine = &entry.machine;

        let Some(position) = machine.position().filter(|_| machine.is_open()) else {
            let _ = self.dismiss.deactivate(&overlay);
            out.layers.extend(self.host.hide(&overlay));
            return;
        };

        let config = machine.config();
        let registration = Registration {
            overlay,
            trigger: entry.trigger,
            surface: entry.surface,
            close_on_esc: config.close_on_esc,
            close_on_click_outside: config.close_on_click_outside,
            track_viewport: config.track_viewport,
        };
        let backdrop = config.backdrop;
        let mode = machine.mode();
        let size = surface
            .or_else(|| self.host.content_bounds(&overlay).map(|r| r.size()))
            .unwrap_or(Size::ZERO);

        if !self.dismiss.is_active(&overlay) {
            let activation = self.dismiss.activate(registration);
            for other in activation.superseded {
                if let Some(j) = self.index_of(&other) {
                    let fx = self.entries[j].machine.close(CloseReason::Superseded);
                    record(out, other, fx);
                }
                out.layers.extend(self.host.hide(&other));
            }
        }
        out.layers
            .extend(self.host.show(overlay, position, size, mode, backdrop));
    }

    fn index_of(&self, overlay: &K) -> Option<usize> {
        self.entries.iter().position(|e| e.overlay == *overlay)
    }
}

fn record<K: Copy>(out: &mut EngineOutput<K>, overlay: K, effects: Vec<Effect>) {
    for fx in effects {
        if fx == Effect::RestoreFocus {
            out.restore_focus.push(overlay);
        }
        out.effects.push((overlay, fx));
    }
}
