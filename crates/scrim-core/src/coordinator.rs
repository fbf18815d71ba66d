// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entry point: activation, viewport tracking, teardown.

use scrim_geom::{resolve_overlay_rect, OverlayRect};
use tracing::{debug, error, info, warn};

use crate::config::{ActivationMode, OverlayConfig};
use crate::event::Event;
use crate::port::{HostView, ListenerId, MediaPlatform, PageEvent};
use crate::session::{MediaSessionState, PlaybackSelector};
use crate::stream::StreamUrl;
use crate::surface::OverlaySurfaceManager;
use crate::OverlayError;

/// Where the coordinator is in its own lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Constructed, not yet activated.
    Idle,
    /// Gesture-gated: viewport listeners live, waiting for the first interaction.
    WaitingForGesture,
    /// Creating the surface and starting playback.
    Activating,
    /// Surface (if creation succeeded) and session are up.
    Active,
    /// Torn down. May be activated again.
    Deactivated,
}

/// Wires page events to geometry, the surface, and the playback session.
///
/// Receives the resolved host view and platform at construction; nothing is
/// looked up globally. Events come in through [`handle`](Self::handle) in
/// delivery order and are processed synchronously.
pub struct LifecycleCoordinator<P: MediaPlatform, H: HostView> {
    platform: P,
    host: H,
    config: OverlayConfig,
    url: StreamUrl,
    phase: Phase,
    page_listeners: Vec<ListenerId>,
    gesture_listener: Option<ListenerId>,
    surfaces: OverlaySurfaceManager<P::Surface>,
    playback: PlaybackSelector<P>,
}

impl<P: MediaPlatform, H: HostView> LifecycleCoordinator<P, H> {
    /// Build a coordinator. Fails only on invalid configuration.
    pub fn new(platform: P, host: H, config: OverlayConfig) -> Result<Self, OverlayError> {
        config.validate()?;
        let url = config.stream_url()?;
        Ok(Self {
            surfaces: OverlaySurfaceManager::new(config.surface.clone()),
            playback: PlaybackSelector::new(config.native_mime.clone(), config.recovery),
            platform,
            host,
            config,
            url,
            phase: Phase::Idle,
            page_listeners: Vec::new(),
            gesture_listener: None,
        })
    }

    /// Subscribe viewport changes and, depending on the activation mode,
    /// start playback now or after the first user gesture.
    pub fn activate(&mut self) {
        if !matches!(self.phase, Phase::Idle | Phase::Deactivated) {
            warn!(phase = ?self.phase, "activate ignored: already active");
            return;
        }
        for event in PageEvent::VIEWPORT {
            let id = self.platform.listen(event);
            self.page_listeners.push(id);
        }
        match self.config.activation {
            ActivationMode::Eager => self.begin(),
            ActivationMode::GestureGated => {
                self.gesture_listener = Some(self.platform.listen(PageEvent::FirstGesture));
                self.phase = Phase::WaitingForGesture;
                debug!("waiting for first user gesture");
            }
        }
    }

    fn begin(&mut self) {
        self.phase = Phase::Activating;
        if let Err(err) = self
            .playback
            .start(&mut self.platform, &mut self.surfaces, self.url.clone())
        {
            error!(%err, url = %self.url, "overlay playback did not start");
        }
        self.phase = Phase::Active;
        self.reposition();
    }

    /// Process one delivered event.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Page(PageEvent::FirstGesture) => self.on_gesture(),
            Event::Page(page) => {
                if self.phase == Phase::Active {
                    self.reposition();
                } else {
                    debug!(?page, phase = ?self.phase, "viewport change before activation");
                }
            }
            Event::Session(session, event) => {
                if self.phase != Phase::Active {
                    debug!(%session, phase = ?self.phase, "session event outside active phase");
                    return;
                }
                self.playback.handle(&mut self.surfaces, session, event);
            }
        }
    }

    fn on_gesture(&mut self) {
        if self.phase != Phase::WaitingForGesture {
            debug!(phase = ?self.phase, "gesture ignored");
            return;
        }
        if let Some(id) = self.gesture_listener.take() {
            self.platform.unlisten(id);
        }
        info!("first user gesture; starting overlay");
        self.begin();
    }

    /// Recompute the overlay rectangle and apply it.
    ///
    /// Returns the applied rectangle; `None` (with a warning) when there is no
    /// surface or the geometry cannot be resolved.
    pub fn reposition(&mut self) -> Option<OverlayRect> {
        if !self.surfaces.exists() {
            warn!("adjust overlay failed: surface missing");
            return None;
        }
        let rect = resolve_overlay_rect(
            self.host.viewport(),
            self.host.object_transform(),
            self.config.fit,
            self.config.origin,
        );
        match rect {
            Ok(rect) => {
                self.surfaces.apply_rect(&rect);
                Some(rect)
            }
            Err(err) => {
                let err = OverlayError::from(err);
                warn!(%err, "adjust overlay failed");
                None
            }
        }
    }

    /// Replace the stream. A running session is torn down and a fresh one
    /// started; before activation only the configured URL changes.
    pub fn switch_stream(&mut self, url: StreamUrl) {
        info!(%url, "switching stream");
        self.url = url;
        if self.phase != Phase::Active {
            return;
        }
        self.playback.stop(&mut self.surfaces);
        self.begin();
    }

    /// Unsubscribe everything, stop playback, remove the surface.
    ///
    /// Safe before activation finished and when called repeatedly.
    pub fn deactivate(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Deactivated) {
            return;
        }
        for id in self.page_listeners.drain(..) {
            self.platform.unlisten(id);
        }
        if let Some(id) = self.gesture_listener.take() {
            self.platform.unlisten(id);
        }
        self.playback.stop(&mut self.surfaces);
        self.surfaces.destroy();
        self.phase = Phase::Deactivated;
        info!("overlay deactivated");
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current media session state.
    pub fn state(&self) -> MediaSessionState {
        self.playback.state()
    }

    /// Stream used by the next (or current) session.
    pub fn url(&self) -> &StreamUrl {
        &self.url
    }

    /// Effective configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Playback selector, for inspection.
    pub fn playback(&self) -> &PlaybackSelector<P> {
        &self.playback
    }

    /// Surface manager, for inspection.
    pub fn surfaces(&self) -> &OverlaySurfaceManager<P::Surface> {
        &self.surfaces
    }

    /// The platform adapter.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The host view.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host view (hosts that push transforms in).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<P: MediaPlatform, H: HostView> Drop for LifecycleCoordinator<P, H> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
