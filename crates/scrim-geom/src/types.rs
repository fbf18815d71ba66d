// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value types shared by the mapper and its callers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scaling policy applied when the displayed rectangle and the design
/// resolution disagree on aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FitPolicy {
    /// Scale to fill the displayed rectangle, cropping the excess.
    #[default]
    Cover,
    /// Scale to fit inside the displayed rectangle, letterboxing the rest.
    Fit,
}

/// Where the host engine puts world (0, 0) on the design canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnchorOrigin {
    /// World origin is the center of the design canvas.
    #[default]
    Center,
    /// World origin is the bottom-left corner of the design canvas.
    BottomLeft,
}

/// Fixed logical canvas size the host content is authored against.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignSize {
    /// Design width in logical units.
    pub width: f64,
    /// Design height in logical units.
    pub height: f64,
}

impl DesignSize {
    /// Creates a design size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in page (client) pixels, +Y down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ScreenRect {
    /// Creates a rectangle from its edges and extent.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Everything the mapper needs to know about the host viewport for one recompute.
///
/// Derived fresh on every trigger; never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewportSnapshot {
    /// Design resolution of the host content.
    pub design: DesignSize,
    /// Bounding rectangle of the host drawable as displayed on the page.
    pub displayed: ScreenRect,
}

impl ViewportSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(design: DesignSize, displayed: ScreenRect) -> Self {
        Self { design, displayed }
    }
}

/// Read-only view of a host object: world position (+Y up) and declared size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectTransform {
    /// World X in design units.
    pub world_x: f64,
    /// World Y in design units, +Y up.
    pub world_y: f64,
    /// Declared width in design units.
    pub width: f64,
    /// Declared height in design units.
    pub height: f64,
}

impl ObjectTransform {
    /// Creates a transform view.
    #[must_use]
    pub const fn new(world_x: f64, world_y: f64, width: f64, height: f64) -> Self {
        Self {
            world_x,
            world_y,
            width,
            height,
        }
    }
}

/// Overlay placement in absolute page pixels; the only output of the mapper.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlayRect {
    /// Left edge in page pixels.
    pub left: f64,
    /// Top edge in page pixels.
    pub top: f64,
    /// Width in page pixels.
    pub width: f64,
    /// Height in page pixels.
    pub height: f64,
}

impl OverlayRect {
    /// Zero-sized rectangle at the page origin; used before the first placement.
    pub const COLLAPSED: Self = Self {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the rectangle covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
