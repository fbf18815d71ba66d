// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Viewport alignment for Scrim overlays.
//!
//! Maps an object living inside a host graphics engine (design-resolution
//! space, +Y up) onto an absolute page rectangle (CSS pixels, +Y down) so a
//! DOM element can sit exactly on top of it.
//!
//! # Design Principles
//!
//! - **Pure** - Every call recomputes from its inputs. Nothing is cached.
//! - **No DOM** - Callers resolve the displayed rectangle; this crate only does arithmetic.
//! - **Never panics** - Unresolvable or degenerate inputs come back as [`GeometryError`].
//!
//! # Crate Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` on the public value types.

use thiserror::Error;

/// Reasons an overlay rectangle could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The host viewport element (or its camera) could not be resolved.
    #[error("host viewport unavailable")]
    ViewportUnavailable,
    /// The host object's transform could not be read.
    #[error("host object transform unavailable")]
    ObjectUnavailable,
    /// Design or displayed size is zero, negative, or not finite.
    #[error("degenerate viewport: {0}")]
    Degenerate(&'static str),
}

mod mapper;
mod types;

pub use mapper::{compute_overlay_rect, rendered_rect, resolve_overlay_rect, scale_for};
pub use types::{
    AnchorOrigin, DesignSize, FitPolicy, ObjectTransform, OverlayRect, ScreenRect,
    ViewportSnapshot,
};
