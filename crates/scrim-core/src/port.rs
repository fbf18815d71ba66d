// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Capability ports the core drives.
//!
//! The core never touches a page, a media element, or a streaming engine
//! directly. Adapters (the browser bridge, test fakes) implement these traits
//! and deliver whatever the platform emits back through
//! [`LifecycleCoordinator::handle`](crate::LifecycleCoordinator::handle).
//!
//! # Listener Semantics
//!
//! Every `listen`/`subscribe` call returns a [`ListenerId`]. Once the matching
//! `unlisten`/`unsubscribe` returns, the adapter must not deliver that
//! listener's events again. Session-scoped listeners carry the [`SessionId`]
//! they were registered for so the core can drop anything stale.

use scrim_geom::{ObjectTransform, OverlayRect, ViewportSnapshot};
use thiserror::Error;

use crate::config::SurfaceStyle;
use crate::stream::StreamUrl;

/// Opaque handle for one registered platform listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Monotonic tag identifying one playback session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Page-level notifications the coordinator subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageEvent {
    /// Window resized.
    Resize,
    /// Device orientation changed.
    OrientationChange,
    /// Document entered or left fullscreen.
    FullscreenChange,
    /// First user interaction (pointer or key). Delivered at most once per listener.
    FirstGesture,
}

impl PageEvent {
    /// Events that change where the host viewport is displayed.
    pub const VIEWPORT: [Self; 3] = [Self::Resize, Self::OrientationChange, Self::FullscreenChange];
}

/// Events emitted by a playable surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    /// The element began loading its source (`loadstart`).
    LoadStart,
    /// Media metadata finished loading (`loadedmetadata`).
    LoadedMetadata,
    /// Playback started or resumed (`playing`).
    Playing,
}

/// Events emitted by the external adaptive engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    /// The engine bound itself to the surface.
    MediaAttached,
    /// The manifest was fetched and parsed.
    ManifestParsed,
    /// The engine reported an error.
    Error,
}

/// Failure reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// A platform capability needed for the call does not exist.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The platform refused the call.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Read-only view of the host graphics engine.
pub trait HostView {
    /// Current design resolution and displayed rectangle, or `None` when the
    /// host drawable (or its camera) cannot be resolved.
    fn viewport(&self) -> Option<ViewportSnapshot>;

    /// World position and declared size of the object the overlay tracks.
    fn object_transform(&self) -> Option<ObjectTransform>;
}

/// Native playable element composited above the host canvas.
pub trait PlayableSurface {
    /// Position and size the surface. Must not allocate.
    fn apply_rect(&mut self, rect: &OverlayRect);

    /// Bind a source directly (native strategy).
    fn set_source(&mut self, url: &StreamUrl);

    /// Whether the element claims support for `mime`.
    fn can_play_type(&self, mime: &str) -> bool;

    /// Request playback.
    ///
    /// A synchronous refusal is returned as an error. An asynchronous refusal
    /// (promise rejection) is delivered later as
    /// [`SessionEvent::PlayRejected`](crate::SessionEvent::PlayRejected).
    fn play(&mut self, session: SessionId) -> Result<(), PortError>;

    /// Register a listener for `event`, tagged with `session`.
    fn listen(&mut self, event: SurfaceEvent, session: SessionId) -> ListenerId;

    /// Remove a listener registered with [`listen`](Self::listen).
    fn unlisten(&mut self, id: ListenerId);

    /// Remove the element from the page and release it.
    fn detach(&mut self);
}

/// Creates playable surfaces. The only path by which the page's DOM is mutated.
pub trait SurfaceFactory {
    /// Concrete surface type.
    type Surface: PlayableSurface;

    /// Create one surface with the given style, collapsed to zero size.
    fn create_surface(&mut self, style: &SurfaceStyle) -> Result<Self::Surface, PortError>;
}

/// External adaptive-streaming engine bound to surfaces of type `S`.
pub trait AdaptiveEngine<S> {
    /// Begin loading the manifest at `url`.
    fn load_source(&mut self, url: &StreamUrl);

    /// Attach the engine's output to `surface`.
    fn attach_media(&mut self, surface: &S);

    /// Register a listener for `event`, tagged with `session`.
    fn subscribe(&mut self, event: EngineEvent, session: SessionId) -> ListenerId;

    /// Remove a listener registered with [`subscribe`](Self::subscribe).
    fn unsubscribe(&mut self, id: ListenerId);

    /// Restart loading after a network fault.
    fn start_load(&mut self);

    /// Attempt to recover from a media (decode) fault.
    fn recover_media_error(&mut self);

    /// Tear down the engine. No further events are emitted afterwards.
    fn destroy(&mut self);
}

/// Everything the browser side provides: surfaces, engines, and page events.
pub trait MediaPlatform: SurfaceFactory {
    /// Concrete engine type.
    type Engine: AdaptiveEngine<Self::Surface>;

    /// Whether the low-level buffering API the external engine needs is usable.
    fn engine_supported(&self) -> bool;

    /// Create a fresh engine instance.
    fn create_engine(&mut self) -> Result<Self::Engine, PortError>;

    /// Register a page-level listener.
    fn listen(&mut self, event: PageEvent) -> ListenerId;

    /// Remove a page-level listener.
    fn unlisten(&mut self, id: ListenerId);
}
