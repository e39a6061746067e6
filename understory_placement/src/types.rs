// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for placement: sides, options, and resolved results.

use core::fmt;
use core::str::FromStr;

use kurbo::Point;

/// Side of the trigger on which a floating surface is placed.
///
/// Each side has exactly one [`opposite`](Placement::opposite), which is the
/// side tried first when the requested one collides with the viewport.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Placement {
    /// Above the trigger.
    #[default]
    Top,
    /// Below the trigger.
    Bottom,
    /// To the left of the trigger.
    Left,
    /// To the right of the trigger.
    Right,
}

impl Placement {
    /// All sides in canonical order.
    ///
    /// This order breaks ties when ranking sides by free space.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// The side across the trigger from `self`.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// True for `Top` and `Bottom`, whose main axis is vertical.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Lowercase name of the side, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse a side name, falling back to the default side for unknown input.
    ///
    /// Use this for configuration coming from outside the program; a typo in a
    /// placement name should not keep a surface from showing.
    pub fn parse_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(p) => p,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(name, error = %_err, "falling back to default placement");
                Self::default()
            }
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string does not name a [`Placement`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown placement; expected one of `top`, `bottom`, `left`, `right`")]
pub struct ParsePlacementError;

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or(ParsePlacementError)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Placement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <alloc::string::String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&name))
    }
}

/// Spacing parameters for [`resolve`](crate::resolve).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacementOptions {
    /// Gap between the trigger and the surface along the main axis.
    pub offset: f64,
    /// Minimum distance kept between the surface and each viewport edge.
    pub padding: f64,
}

impl PlacementOptions {
    /// Default gap between trigger and surface.
    pub const DEFAULT_OFFSET: f64 = 8.0;
    /// Default viewport edge padding.
    pub const DEFAULT_PADDING: f64 = 5.0;
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            offset: Self::DEFAULT_OFFSET,
            padding: Self::DEFAULT_PADDING,
        }
    }
}

/// How a resolved position was reached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// The requested side fit.
    Requested,
    /// The opposite side fit.
    Flipped,
    /// Another side, chosen by free space, fit.
    Ranked,
    /// Nothing fit; the requested candidate was translated into the viewport.
    Shifted,
    /// Centered in the viewport without an anchor.
    Centered,
}

/// Output of [`resolve`](crate::resolve).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolved {
    /// Top-left corner of the surface in viewport coordinates.
    pub position: Point,
    /// Side actually used.
    pub placement: Placement,
    /// Collision-avoidance step that produced the position.
    pub strategy: Strategy,
}
