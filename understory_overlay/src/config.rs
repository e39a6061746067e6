// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-overlay configuration.

use core::time::Duration;

use understory_placement::{Placement, PlacementOptions};

/// When an overlay gets a backdrop layer beneath its surface.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BackdropPolicy {
    /// Never mount a backdrop.
    Never,
    /// Mount an input-catching backdrop in mobile mode only.
    #[default]
    MobileOnly,
    /// Always mount a backdrop; it only catches input in mobile mode.
    Always,
}

/// Configuration for one overlay.
///
/// ```
/// use core::time::Duration;
/// use understory_overlay::config::OverlayConfig;
/// use understory_placement::Placement;
///
/// let cfg = OverlayConfig::default()
///     .with_placement(Placement::Right)
///     .with_hover_delay(Duration::from_millis(300));
/// assert_eq!(cfg.offset, 8.0);
/// assert!(cfg.close_on_esc);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    /// Preferred side of the trigger.
    pub placement: Placement,
    /// Gap between trigger and surface.
    pub offset: f64,
    /// Minimum distance between surface and viewport edges.
    pub padding: f64,
    /// Hover intent delay before opening.
    pub hover_delay: Duration,
    /// Delay before closing after hover or focus is lost.
    pub hide_delay: Duration,
    /// Close on Escape (and return focus to the trigger).
    pub close_on_esc: bool,
    /// Close on a pointer press outside trigger and surface.
    pub close_on_click_outside: bool,
    /// Ignore all input and stay closed.
    pub disabled: bool,
    /// Viewport widths below this are mobile.
    pub mobile_breakpoint: f64,
    /// Reposition on window resize and scroll while visible.
    pub track_viewport: bool,
    /// Backdrop policy for the host.
    pub backdrop: BackdropPolicy,
}

impl OverlayConfig {
    /// Default hover intent delay.
    pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(200);
    /// Default hide delay.
    pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(150);
    /// Default mobile breakpoint.
    pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 1024.0;

    /// Set the preferred side.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the trigger gap.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the viewport edge padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the hover intent delay.
    pub fn with_hover_delay(mut self, delay: Duration) -> Self {
        self.hover_delay = delay;
        self
    }

    /// Set the hide delay.
    pub fn with_hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay = delay;
        self
    }

    /// Enable or disable closing on Escape.
    pub fn with_close_on_esc(mut self, yes: bool) -> Self {
        self.close_on_esc = yes;
        self
    }

    /// Enable or disable closing on outside presses.
    pub fn with_close_on_click_outside(mut self, yes: bool) -> Self {
        self.close_on_click_outside = yes;
        self
    }

    /// Start disabled.
    pub fn with_disabled(mut self, yes: bool) -> Self {
        self.disabled = yes;
        self
    }

    /// Set the mobile breakpoint.
    pub fn with_mobile_breakpoint(mut self, width: f64) -> Self {
        self.mobile_breakpoint = width;
        self
    }

    /// Reposition on resize and scroll while visible.
    pub fn with_track_viewport(mut self, yes: bool) -> Self {
        self.track_viewport = yes;
        self
    }

    /// Set the backdrop policy.
    pub fn with_backdrop(mut self, backdrop: BackdropPolicy) -> Self {
        self.backdrop = backdrop;
        self
    }

    /// Spacing as passed to the placement resolver.
    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            offset: self.offset,
            padding: self.padding,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            offset: PlacementOptions::DEFAULT_OFFSET,
            padding: PlacementOptions::DEFAULT_PADDING,
            hover_delay: Self::DEFAULT_HOVER_DELAY,
            hide_delay: Self::DEFAULT_HIDE_DELAY,
            close_on_esc: true,
            close_on_click_outside: true,
            disabled: false,
            mobile_breakpoint: Self::DEFAULT_MOBILE_BREAKPOINT,
            track_viewport: false,
            backdrop: BackdropPolicy::MobileOnly,
        }
    }
}
