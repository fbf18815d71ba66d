// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scrim core: keeps a native media surface glued to an object inside a
//! host graphics engine and keeps an HLS session on it alive.
//!
//! Platform-agnostic. The browser lives behind the traits in [`port`]; the
//! wasm bridge implements them and feeds platform events back through
//! [`LifecycleCoordinator::handle`].
//!
//! # Components
//!
//! - [`OverlaySurfaceManager`] - the one overlay surface: create, position, remove.
//! - [`PlaybackSelector`] - engine vs native strategy, session state machine.
//! - [`RecoveryController`] - fault category → recovery command.
//! - [`LifecycleCoordinator`] - activation (eager or gesture-gated), viewport
//!   tracking, teardown.
//!
//! Single-threaded and event-driven: nothing here blocks or spawns.

use thiserror::Error;

pub mod config;
mod coordinator;
mod event;
pub mod fault;
pub mod port;
mod session;
mod stream;
mod surface;

pub use config::{ActivationMode, ConfigError, OverlayConfig, RecoveryPolicy, SurfaceStyle};
pub use coordinator::{LifecycleCoordinator, Phase};
pub use event::{Event, SessionEvent};
pub use fault::{FaultCategory, FaultRecord, RecoveryCommand, RecoveryController};
pub use port::{
    AdaptiveEngine, EngineEvent, HostView, ListenerId, MediaPlatform, PageEvent, PlayableSurface,
    PortError, SessionId, SurfaceEvent, SurfaceFactory,
};
pub use scrim_geom::{
    AnchorOrigin, DesignSize, FitPolicy, GeometryError, ObjectTransform, OverlayRect, ScreenRect,
    ViewportSnapshot,
};
pub use session::{MediaSessionState, PlaybackSelector, Strategy};
pub use stream::{StreamUrl, HLS_MIME};
pub use surface::{OverlaySurfaceManager, SurfaceId};

/// Everything that can go wrong in the core.
///
/// The coordinator logs these and carries on; none of them escape as a
/// panic or take the host down.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Host viewport, camera, or object could not be resolved.
    #[error("geometry unavailable: {0}")]
    GeometryUnavailable(#[from] GeometryError),
    /// An operation needed the surface before it existed.
    #[error("overlay surface missing")]
    SurfaceMissing,
    /// Neither the adaptive engine nor native playback can handle the stream.
    #[error("unsupported stream: {0}")]
    UnsupportedFormat(String),
    /// The platform refused `play()`.
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    /// A stream fault reported by the adaptive engine.
    #[error("stream fault: {0}")]
    StreamFault(FaultCategory),
    /// Adapter failure.
    #[error(transparent)]
    Port(#[from] PortError),
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
