// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Playback strategy selection and the media session state machine.
//!
//! ```text
//! Uncreated ─start─▶ Created ─attached─▶ Attached ─parsed/metadata─▶ Playing
//!                                        │                          │  ▲
//!                                        └──────── fault ───────▶ Faulted
//!                                                                   │
//!                     any state ─stop / fatal fault─▶ Destroyed ◀───┘
//! ```

use tracing::{debug, error, info, warn};

use crate::config::RecoveryPolicy;
use crate::event::SessionEvent;
use crate::fault::{FaultRecord, RecoveryCommand, RecoveryController};
use crate::port::{
    AdaptiveEngine, EngineEvent, ListenerId, MediaPlatform, PlayableSurface, SessionId,
    SurfaceEvent,
};
use crate::stream::StreamUrl;
use crate::surface::OverlaySurfaceManager;
use crate::OverlayError;

/// Lifecycle of one media session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaSessionState {
    /// Nothing exists yet.
    Uncreated,
    /// Surface exists; stream handed over but not yet bound.
    Created,
    /// Stream bound to the surface; waiting for manifest/metadata.
    Attached,
    /// `play()` invoked.
    Playing,
    /// Recoverable fault seen; recovery command issued.
    Faulted,
    /// Torn down. Surface removed, engine released.
    Destroyed,
}

impl MediaSessionState {
    /// Whether a surface is expected to exist in this state.
    pub const fn has_surface(self) -> bool {
        !matches!(self, Self::Uncreated | Self::Destroyed)
    }
}

/// How the stream reaches the surface. Fixed for a session's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// External adaptive engine feeds the surface.
    ExternalEngine,
    /// The surface plays the manifest itself.
    Native,
}

#[derive(Clone, Copy, Debug)]
enum Listener {
    Surface(ListenerId),
    Engine(ListenerId),
}

/// Picks a strategy per session, owns the engine, and reacts to session events.
pub struct PlaybackSelector<P: MediaPlatform> {
    native_mime: String,
    policy: RecoveryPolicy,
    state: MediaSessionState,
    session: Option<SessionId>,
    next_session: u64,
    strategy: Option<Strategy>,
    url: Option<StreamUrl>,
    engine: Option<P::Engine>,
    listeners: Vec<Listener>,
    recovery: RecoveryController,
    degraded: bool,
    last_report: Option<OverlayError>,
}

impl<P: MediaPlatform> PlaybackSelector<P> {
    /// Selector probing `native_mime` for native playback and recovering per `policy`.
    pub fn new(native_mime: impl Into<String>, policy: RecoveryPolicy) -> Self {
        Self {
            native_mime: native_mime.into(),
            policy,
            state: MediaSessionState::Uncreated,
            session: None,
            next_session: 1,
            strategy: None,
            url: None,
            engine: None,
            listeners: Vec::new(),
            recovery: RecoveryController::new(policy),
            degraded: false,
            last_report: None,
        }
    }

    /// Start a fresh session for `url`, creating the surface when needed.
    ///
    /// Any running session is stopped first. The session stays in `Created`
    /// until the engine or element reports the stream bound. On
    /// `UnsupportedFormat` the surface stays up in `Created` with nothing
    /// bound to it.
    pub fn start(
        &mut self,
        platform: &mut P,
        surfaces: &mut OverlaySurfaceManager<P::Surface>,
        url: StreamUrl,
    ) -> Result<SessionId, OverlayError> {
        if self.session.is_some() {
            debug!("replacing running session");
            self.stop(surfaces);
        }

        let id = SessionId(self.next_session);
        self.next_session = self.next_session.wrapping_add(1);
        self.recovery = RecoveryController::new(self.policy);
        self.degraded = false;
        self.last_report = None;
        self.strategy = None;

        if let Err(err) = surfaces.create(platform) {
            error!(%url, %err, "play video failed: could not create overlay surface");
            self.state = MediaSessionState::Uncreated;
            return Err(err.into());
        }
        self.session = Some(id);
        self.url = Some(url.clone());
        self.state = MediaSessionState::Created;

        let Some(surface) = surfaces.get_mut() else {
            return Err(OverlayError::SurfaceMissing);
        };

        if platform.engine_supported() {
            let mut engine = match platform.create_engine() {
                Ok(engine) => engine,
                Err(err) => {
                    error!(%url, %err, "play video failed: adaptive engine unavailable");
                    return Err(err.into());
                }
            };
            self.listeners.extend([
                Listener::Engine(engine.subscribe(EngineEvent::MediaAttached, id)),
                Listener::Engine(engine.subscribe(EngineEvent::ManifestParsed, id)),
                Listener::Engine(engine.subscribe(EngineEvent::Error, id)),
                Listener::Surface(surface.listen(SurfaceEvent::Playing, id)),
            ]);
            engine.load_source(&url);
            engine.attach_media(surface);
            self.engine = Some(engine);
            self.strategy = Some(Strategy::ExternalEngine);
        } else if surface.can_play_type(&self.native_mime) {
            self.listeners.extend([
                Listener::Surface(surface.listen(SurfaceEvent::LoadStart, id)),
                Listener::Surface(surface.listen(SurfaceEvent::LoadedMetadata, id)),
                Listener::Surface(surface.listen(SurfaceEvent::Playing, id)),
            ]);
            surface.set_source(&url);
            self.strategy = Some(Strategy::Native);
        } else {
            error!(%url, mime = %self.native_mime, "play video failed: not supported");
            return Err(OverlayError::UnsupportedFormat(url.to_string()));
        }

        info!(%url, session = %id, strategy = ?self.strategy, "stream handed to surface");
        Ok(id)
    }

    /// React to one session event. Events for other sessions are dropped.
    pub fn handle(
        &mut self,
        surfaces: &mut OverlaySurfaceManager<P::Surface>,
        session: SessionId,
        event: SessionEvent,
    ) {
        if self.session != Some(session) || !self.state.has_surface() {
            debug!(%session, ?event, "dropping event for inactive session");
            return;
        }
        match event {
            SessionEvent::MediaAttached => {
                if self.state == MediaSessionState::Created {
                    self.state = MediaSessionState::Attached;
                    info!(%session, "stream attached");
                }
            }
            SessionEvent::ManifestParsed if self.strategy == Some(Strategy::ExternalEngine) => {
                self.play(surfaces, session);
            }
            SessionEvent::MetadataLoaded if self.strategy == Some(Strategy::Native) => {
                self.play(surfaces, session);
            }
            SessionEvent::ManifestParsed | SessionEvent::MetadataLoaded => {
                debug!(%session, ?event, strategy = ?self.strategy, "event does not apply to strategy");
            }
            SessionEvent::Playing => {
                if self.state == MediaSessionState::Faulted {
                    info!(%session, "playback recovered");
                }
                if matches!(
                    self.state,
                    MediaSessionState::Created
                        | MediaSessionState::Attached
                        | MediaSessionState::Faulted
                ) {
                    self.state = MediaSessionState::Playing;
                }
                self.recovery.reset();
            }
            SessionEvent::Fault(record) => self.on_fault(surfaces, &record),
            SessionEvent::PlayRejected(reason) => self.rejected(session, reason),
        }
    }

    fn play(&mut self, surfaces: &mut OverlaySurfaceManager<P::Surface>, session: SessionId) {
        let Some(surface) = surfaces.get_mut() else {
            warn!(%session, "play skipped: overlay surface missing");
            return;
        };
        let outcome = surface.play(session);
        self.state = MediaSessionState::Playing;
        if let Err(err) = outcome {
            self.rejected(session, err.to_string());
        }
    }

    fn rejected(&mut self, session: SessionId, reason: String) {
        let err = OverlayError::PlaybackRejected(reason);
        warn!(%session, %err, "waiting for the user to start playback");
        self.degraded = true;
        self.last_report = Some(err);
    }

    fn on_fault(&mut self, surfaces: &mut OverlaySurfaceManager<P::Surface>, record: &FaultRecord) {
        let url = self.url.as_ref().map_or("", StreamUrl::as_str);
        let Some(engine) = self.engine.as_mut() else {
            warn!(url, category = %record.category, "fault reported without an engine; ignored");
            return;
        };
        self.last_report = Some(OverlayError::StreamFault(record.category));
        match self.recovery.decide(record) {
            RecoveryCommand::ReloadSource => {
                engine.start_load();
                self.state = MediaSessionState::Faulted;
                warn!(url, detail = %record.detail, "hls network fault, start reconnecting");
            }
            RecoveryCommand::RecoverMedia => {
                engine.recover_media_error();
                self.state = MediaSessionState::Faulted;
                warn!(url, detail = %record.detail, "hls media fault, trying to recover");
            }
            RecoveryCommand::DestroySession => {
                error!(
                    url,
                    category = %record.category,
                    detail = %record.detail,
                    attempts = self.recovery.attempts(record.category),
                    "hls fault not recoverable, closing session"
                );
                self.stop(surfaces);
            }
        }
    }

    /// Unsubscribe every session listener, release the engine, remove the surface.
    ///
    /// Safe to call repeatedly and before any session started.
    pub fn stop(&mut self, surfaces: &mut OverlaySurfaceManager<P::Surface>) {
        for listener in core::mem::take(&mut self.listeners) {
            match listener {
                Listener::Surface(id) => {
                    if let Some(surface) = surfaces.get_mut() {
                        surface.unlisten(id);
                    }
                }
                Listener::Engine(id) => {
                    if let Some(engine) = self.engine.as_mut() {
                        engine.unsubscribe(id);
                    }
                }
            }
        }
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        surfaces.destroy();

        if let Some(session) = self.session.take() {
            info!(%session, "session destroyed");
        }
        if self.state != MediaSessionState::Uncreated {
            self.state = MediaSessionState::Destroyed;
        }
    }

    /// Current state.
    pub fn state(&self) -> MediaSessionState {
        self.state
    }

    /// Id of the running session.
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Strategy chosen for the running session.
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Stream of the most recent session.
    pub fn url(&self) -> Option<&StreamUrl> {
        self.url.as_ref()
    }

    /// True once a `play()` rejection was seen in this session.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Most recent non-fatal report (play rejection or stream fault) of this session.
    pub fn last_report(&self) -> Option<&OverlayError> {
        self.last_report.as_ref()
    }

    /// Recovery bookkeeping of the running session.
    pub fn recovery(&self) -> &RecoveryController {
        &self.recovery
    }
}
