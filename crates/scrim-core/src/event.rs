// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Events adapters deliver into the coordinator.

use crate::fault::FaultRecord;
use crate::port::{PageEvent, SessionId};

/// Everything the coordinator reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Page-level notification (viewport change or first gesture).
    Page(PageEvent),
    /// Notification from the surface or engine of one playback session.
    Session(SessionId, SessionEvent),
}

/// Session-scoped notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The stream is bound to the surface (engine attached or native load started).
    MediaAttached,
    /// Engine finished parsing the manifest.
    ManifestParsed,
    /// Native element finished loading metadata.
    MetadataLoaded,
    /// Surface reported that playback is running.
    Playing,
    /// Engine error, already classified.
    Fault(FaultRecord),
    /// `play()` was rejected asynchronously (autoplay policy and the like).
    PlayRejected(String),
}
