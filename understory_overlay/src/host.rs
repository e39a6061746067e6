// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay host: a detached layer stack for visible surfaces.
//!
//! ## Overview
//!
//! Surfaces are mounted in the host's own stack rather than inside the
//! trigger's subtree, so ancestor clips and transforms cannot cut them off or
//! move them. Each visible overlay owns a content layer and, depending on its
//! [`BackdropPolicy`] and the [`ViewportMode`], a backdrop layer directly
//! beneath it that covers the viewport.
//!
//! In mobile mode the backdrop is pickable: a press on it is a press outside
//! the surface, and the host toolkit should route it as such. In desktop mode
//! the backdrop (if any) is input-transparent so the page stays interactive.
//!
//! The most recently mounted overlay stacks on top. Hiding an overlay removes
//! every layer it owns.
//!
//! Every call returns [`LayerChange`] records; [`damage_bounds`] folds them
//! into a single repaint rectangle.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::config::BackdropPolicy;
use crate::types::ViewportMode;

bitflags::bitflags! {
    /// Layer flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u8 {
        /// Layer is drawn.
        const VISIBLE  = 0b0000_0001;
        /// Layer receives pointer input.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Role of a layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LayerKind {
    /// Full-viewport layer beneath a surface.
    Backdrop,
    /// The surface content.
    Content,
}

/// One mounted layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layer<K> {
    /// Owning overlay.
    pub overlay: K,
    /// Role.
    pub kind: LayerKind,
    /// Box in viewport coordinates.
    pub bounds: Rect,
    /// Stacking order; higher is on top.
    pub z_index: i32,
    /// Visibility and picking.
    pub flags: LayerFlags,
}

/// A change to the layer stack.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LayerChange<K> {
    /// A layer was added.
    Mounted {
        /// Owning overlay.
        overlay: K,
        /// Role.
        kind: LayerKind,
        /// New box.
        bounds: Rect,
    },
    /// A layer moved, resized, or changed flags.
    Updated {
        /// Owning overlay.
        overlay: K,
        /// Role.
        kind: LayerKind,
        /// Previous box.
        old: Rect,
        /// New box.
        new: Rect,
    },
    /// A layer was removed.
    Unmounted {
        /// Owning overlay.
        overlay: K,
        /// Role.
        kind: LayerKind,
        /// Last box.
        bounds: Rect,
    },
}

impl<K> LayerChange<K> {
    /// Region affected by this change.
    pub fn damage(&self) -> Rect {
        match self {
            Self::Mounted { bounds, .. } | Self::Unmounted { bounds, .. } => *bounds,
            Self::Updated { old, new, .. } => old.union(*new),
        }
    }
}

/// Union of the regions affected by `changes`, or `None` if there are none.
pub fn damage_bounds<K>(changes: &[LayerChange<K>]) -> Option<Rect> {
    let mut it = changes.iter().map(LayerChange::damage);
    let first = it.next()?;
    Some(it.fold(first, |acc, r| acc.union(r)))
}

/// Result of [`OverlayHost::hit_test`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayerHit<K> {
    /// Owning overlay.
    pub overlay: K,
    /// Role of the layer hit.
    pub kind: LayerKind,
}

/// Layer stack for visible overlays.
#[derive(Clone, Debug)]
pub struct OverlayHost<K> {
    layers: Vec<Layer<K>>,
    viewport: Size,
    base_z: i32,
    next_z: i32,
}

impl<K: Copy + Eq> OverlayHost<K> {
    /// Default z-index of the lowest overlay layer.
    pub const DEFAULT_BASE_Z: i32 = 1000;

    /// Create an empty host for a viewport of the given size.
    pub fn new(viewport: Size) -> Self {
        Self::with_base_z(viewport, Self::DEFAULT_BASE_Z)
    }

    /// Create an empty host whose layers start at `base_z`.
    pub fn with_base_z(viewport: Size, base_z: i32) -> Self {
        Self {
            layers: Vec::new(),
            viewport,
            base_z,
            next_z: base_z,
        }
    }

    /// Layers in paint order (bottom first).
    pub fn layers(&self) -> &[Layer<K>] {
        &self.layers
    }

    /// True if `overlay` has any mounted layer.
    pub fn is_mounted(&self, overlay: &K) -> bool {
        self.layers.iter().any(|l| l.overlay == *overlay)
    }

    /// Content box of `overlay`, if mounted.
    pub fn content_bounds(&self, overlay: &K) -> Option<Rect> {
        self.find(overlay, LayerKind::Content).map(|i| self.layers[i].bounds)
    }

    /// True if `overlay` currently has a backdrop.
    pub fn has_backdrop(&self, overlay: &K) -> bool {
        self.find(overlay, LayerKind::Backdrop).is_some()
    }

    /// Mount `overlay` at `position`, or update it if already mounted.
    pub fn show(
        &mut self,
        overlay: K,
        position: Point,
        size: Size,
        mode: ViewportMode,
        backdrop: BackdropPolicy,
    ) -> Vec<LayerChange<K>> {
        let mut out = Vec::new();
        let content = Rect::from_origin_size(position, size);
        let wants_backdrop = match backdrop {
            BackdropPolicy::Never => false,
            BackdropPolicy::MobileOnly => mode == ViewportMode::Mobile,
            BackdropPolicy::Always => true,
        };
        let mut backdrop_flags = LayerFlags::VISIBLE;
        backdrop_flags.set(LayerFlags::PICKABLE, mode == ViewportMode::Mobile);

        let Some(ci) = self.find(&overlay, LayerKind::Content) else {
            let z = self.next_z;
            self.next_z = self.next_z.saturating_add(2);
            if wants_backdrop {
                self.mount(
                    overlay,
                    LayerKind::Backdrop,
                    self.viewport_rect(),
                    z,
                    backdrop_flags,
                    &mut out,
                );
            }
            self.mount(
                overlay,
                LayerKind::Content,
                content,
                z + 1,
                LayerFlags::default(),
                &mut out,
            );
            return out;
        };

        self.update(ci, content, LayerFlags::default(), &mut out);
        match (self.find(&overlay, LayerKind::Backdrop), wants_backdrop) {
            (Some(bi), true) => self.update(bi, self.viewport_rect(), backdrop_flags, &mut out),
            (Some(bi), false) => self.unmount(bi, &mut out),
            (None, true) => {
                let z = self.layers[ci].z_index - 1;
                self.mount(
                    overlay,
                    LayerKind::Backdrop,
                    self.viewport_rect(),
                    z,
                    backdrop_flags,
                    &mut out,
                );
            }
            (None, false) => {}
        }
        out
    }

    /// Remove every layer of `overlay`. No residue remains.
    pub fn hide(&mut self, overlay: &K) -> Vec<LayerChange<K>> {
        let mut out = Vec::new();
        while let Some(i) = self.layers.iter().rposition(|l| l.overlay == *overlay) {
            self.unmount(i, &mut out);
        }
        if self.layers.is_empty() {
            self.next_z = self.base_z;
        }
        out
    }

    /// Resize the viewport; backdrops follow.
    pub fn set_viewport(&mut self, viewport: Size) -> Vec<LayerChange<K>> {
        self.viewport = viewport;
        let rect = self.viewport_rect();
        let mut out = Vec::new();
        for i in 0..self.layers.len() {
            if self.layers[i].kind == LayerKind::Backdrop {
                let flags = self.layers[i].flags;
                self.update(i, rect, flags, &mut out);
            }
        }
        out
    }

    /// Topmost visible, pickable layer containing `pt`.
    pub fn hit_test(&self, pt: Point) -> Option<LayerHit<K>> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.flags.contains(LayerFlags::VISIBLE | LayerFlags::PICKABLE))
            .find(|l| l.bounds.contains(pt))
            .map(|l| LayerHit {
                overlay: l.overlay,
                kind: l.kind,
            })
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.viewport)
    }

    fn find(&self, overlay: &K, kind: LayerKind) -> Option<usize> {
        self.layers
            .iter()
            .position(|l| l.overlay == *overlay && l.kind == kind)
    }

    fn mount(
        &mut self,
        overlay: K,
        kind: LayerKind,
        bounds: Rect,
        z_index: i32,
        flags: LayerFlags,
        out: &mut Vec<LayerChange<K>>,
    ) {
        let layer = Layer {
            overlay,
            kind,
            bounds,
            z_index,
            flags,
        };
        // Keep paint order; equal z stays in insertion order.
        let at = self.layers.partition_point(|l| l.z_index <= z_index);
        self.layers.insert(at, layer);
        out.push(LayerChange::Mounted {
            overlay,
            kind,
            bounds,
        });
    }

    fn update(&mut self, i: usize, bounds: Rect, flags: LayerFlags, out: &mut Vec<LayerChange<K>>) {
        let layer = &mut self.layers[i];
        if layer.bounds == bounds && layer.flags == flags {
            return;
        }
        let old = layer.bounds;
        layer.bounds = bounds;
        layer.flags = flags;
        out.push(LayerChange::Updated {
            overlay: layer.overlay,
            kind: layer.kind,
            old,
            new: bounds,
        });
    }

    fn unmount(&mut self, i: usize, out: &mut Vec<LayerChange<K>>) {
        let layer = self.layers.remove(i);
        out.push(LayerChange::Unmounted {
            overlay: layer.overlay,
            kind: layer.kind,
            bounds: layer.bounds,
        });
    }
}
