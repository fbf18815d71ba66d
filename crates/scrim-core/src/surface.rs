// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ownership of the single overlay surface.

use scrim_geom::OverlayRect;
use tracing::{debug, warn};

use crate::config::SurfaceStyle;
use crate::port::{PlayableSurface, PortError, SurfaceFactory};

/// Identifier of one created surface; increases with each `create`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

/// Creates, positions, and removes the overlay surface.
///
/// Holds at most one surface. All page mutation in the core goes through here.
pub struct OverlaySurfaceManager<S> {
    style: SurfaceStyle,
    current: Option<(SurfaceId, S)>,
    next_id: u32,
    last_rect: Option<OverlayRect>,
}

impl<S: PlayableSurface> OverlaySurfaceManager<S> {
    /// Manager that styles new surfaces with `style`.
    pub fn new(style: SurfaceStyle) -> Self {
        Self {
            style,
            current: None,
            next_id: 1,
            last_rect: None,
        }
    }

    /// Create the surface, or return the existing one's id.
    pub fn create<F>(&mut self, factory: &mut F) -> Result<SurfaceId, PortError>
    where
        F: SurfaceFactory<Surface = S>,
    {
        if let Some((id, _)) = &self.current {
            return Ok(*id);
        }
        let surface = factory.create_surface(&self.style)?;
        let id = SurfaceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.current = Some((id, surface));
        self.last_rect = Some(OverlayRect::COLLAPSED);
        debug!(surface = id.0, "overlay surface created");
        Ok(id)
    }

    /// Position the surface. Returns `false` (and warns) when there is none.
    pub fn apply_rect(&mut self, rect: &OverlayRect) -> bool {
        let Some((_, surface)) = self.current.as_mut() else {
            warn!("apply_rect skipped: overlay surface missing");
            return false;
        };
        surface.apply_rect(rect);
        self.last_rect = Some(*rect);
        true
    }

    /// Detach and release the surface. No-op when none exists.
    pub fn destroy(&mut self) {
        if let Some((id, mut surface)) = self.current.take() {
            surface.detach();
            debug!(surface = id.0, "overlay surface destroyed");
        }
        self.last_rect = None;
    }

    /// Whether a surface currently exists.
    pub fn exists(&self) -> bool {
        self.current.is_some()
    }

    /// Id of the current surface.
    pub fn id(&self) -> Option<SurfaceId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    /// Most recently applied rectangle.
    pub fn last_rect(&self) -> Option<OverlayRect> {
        self.last_rect
    }

    /// Borrow the surface.
    pub fn get(&self) -> Option<&S> {
        self.current.as_ref().map(|(_, s)| s)
    }

    /// Mutably borrow the surface.
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.current.as_mut().map(|(_, s)| s)
    }
}
