// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Scrim for the browser: a `<video>` overlay glued to an object drawn on a
//! game canvas, fed by hls.js or native HLS.
//!
//! # Usage (from JavaScript)
//!
//! ```js
//! import init, { OverlayPlayer } from 'scrim-web';
//!
//! await init();
//! const player = new OverlayPlayer({
//!   stream_url: 'https://example.com/live/index.m3u8',
//!   activation: 'gesture_gated',
//!   canvas_selector: '#game',
//!   design: { width: 960, height: 640 },
//! });
//! player.set_object_transform(0, 0, 200, 100);
//! player.activate();
//!
//! // every frame the host object moves:
//! player.set_object_transform(x, y, w, h);
//!
//! player.deactivate();
//! ```
//!
//! hls.js is optional: load it as a global `Hls` script to get the adaptive
//! engine, otherwise native HLS is probed.

use std::rc::Rc;
use std::sync::Once;

use scrim_core::{
    ConfigError, Event, LifecycleCoordinator, MediaSessionState, ObjectTransform, OverlayError,
    PageEvent, Phase, StreamUrl,
};
use thiserror::Error;
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::dispatch::microtask;

mod config;
pub mod dispatch;
mod hls;
mod host;
mod platform;

pub use config::{WebConfig, DEFAULT_CANVAS_SELECTOR};
pub use dispatch::{Dispatcher, EventHandler, EventSink};
pub use host::WebHost;
pub use platform::{WebEngine, WebPlatform, WebSurface};

/// Failures of the browser bridge.
#[derive(Debug, Error)]
pub enum WebError {
    /// No `window` / `document` (not running in a page).
    #[error("no browser window")]
    NoWindow,
    /// The configured canvas selector matched nothing.
    #[error("canvas not found: {0}")]
    CanvasMissing(String),
    /// The JS config object could not be decoded.
    #[error("config decode failed: {0}")]
    Decode(String),
    /// A DOM call threw.
    #[error("js error: {0}")]
    Js(String),
    /// Another call is still running on this player.
    #[error("overlay player busy")]
    Busy,
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Core failure.
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

fn js_err(err: WebError) -> JsError {
    JsError::new(&err.to_string())
}

static LOGGING: Once = Once::new();

fn install_hooks() {
    #[cfg(feature = "console-panic")]
    console_error_panic_hook::set_once();
    LOGGING.call_once(|| {
        if tracing_wasm::try_set_as_global_default().is_err() {
            debug!("global tracing subscriber already installed");
        }
    });
}

const fn state_name(state: MediaSessionState) -> &'static str {
    match state {
        MediaSessionState::Uncreated => "uncreated",
        MediaSessionState::Created => "created",
        MediaSessionState::Attached => "attached",
        MediaSessionState::Playing => "playing",
        MediaSessionState::Faulted => "faulted",
        MediaSessionState::Destroyed => "destroyed",
    }
}

const fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::WaitingForGesture => "waiting_for_gesture",
        Phase::Activating => "activating",
        Phase::Active => "active",
        Phase::Deactivated => "deactivated",
    }
}

/// Coordinator type the browser runs.
pub type WebCoordinator = LifecycleCoordinator<WebPlatform, WebHost>;

// ─── OverlayPlayer ───────────────────────────────────────────────────────────

/// One overlay on the page.
///
/// Single-threaded; create one per overlay. Dropping it (or calling `free()`
/// from JS) tears the overlay down.
#[wasm_bindgen]
pub struct OverlayPlayer {
    dispatcher: Rc<Dispatcher<WebCoordinator>>,
}

#[wasm_bindgen]
impl OverlayPlayer {
    /// Build a player from a config object (see [`WebConfig`]); `undefined`
    /// takes every default.
    ///
    /// # Errors
    ///
    /// Invalid config, no document, or no canvas matching the selector.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Self, JsError> {
        install_hooks();
        let config = if config.is_undefined() || config.is_null() {
            WebConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| js_err(WebError::Decode(err.to_string())))?
        };
        Self::with_config(config).map_err(js_err)
    }

    /// Start tracking the viewport and, per the activation mode, playback.
    ///
    /// # Errors
    ///
    /// Only when called re-entrantly from inside another player call.
    pub fn activate(&self) -> Result<(), JsError> {
        self.with(WebCoordinator::activate)
    }

    /// Remove the overlay and every listener. Repeatable.
    ///
    /// # Errors
    ///
    /// Only when called re-entrantly from inside another player call.
    pub fn deactivate(&self) -> Result<(), JsError> {
        self.with(WebCoordinator::deactivate)
    }

    /// Push the tracked object's world position and size, then reposition.
    ///
    /// # Errors
    ///
    /// Only when called re-entrantly from inside another player call.
    pub fn set_object_transform(
        &self,
        world_x: f64,
        world_y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), JsError> {
        let object = ObjectTransform::new(world_x, world_y, width, height);
        self.with(|c| {
            c.host_mut().set_object(Some(object));
            if c.phase() == Phase::Active && c.surfaces().exists() {
                c.reposition();
            }
        })
    }

    /// Forget the tracked object (host node gone). The overlay stays where it is.
    ///
    /// # Errors
    ///
    /// Only when called re-entrantly from inside another player call.
    pub fn clear_object_transform(&self) -> Result<(), JsError> {
        self.with(|c| c.host_mut().set_object(None))
    }

    /// Recompute placement after a layout change the page events miss
    /// (host-driven canvas resize, say).
    ///
    /// # Errors
    ///
    /// Only when called re-entrantly from inside another player call.
    pub fn notify_viewport_changed(&self) -> Result<(), JsError> {
        self.with(|c| c.handle(Event::Page(PageEvent::Resize)))
    }

    /// Play a different stream on the same overlay.
    ///
    /// # Errors
    ///
    /// Blank URL, or a re-entrant call.
    pub fn switch_stream(&self, url: &str) -> Result<(), JsError> {
        let url = StreamUrl::new(url).map_err(|err| js_err(err.into()))?;
        self.with(|c| c.switch_stream(url))
    }

    /// Media session state: `uncreated`, `created`, `attached`, `playing`,
    /// `faulted` or `destroyed`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.dispatcher
            .with(|c| state_name(c.state()))
            .unwrap_or("uncreated")
            .to_owned()
    }

    /// Coordinator phase, e.g. `waiting_for_gesture`.
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.dispatcher
            .with(|c| phase_name(c.phase()))
            .unwrap_or("deactivated")
            .to_owned()
    }

    /// True once the platform refused `play()` in this session (autoplay policy).
    #[wasm_bindgen(getter)]
    pub fn degraded(&self) -> bool {
        self.dispatcher
            .with(|c| c.playback().is_degraded())
            .unwrap_or(false)
    }
}

impl OverlayPlayer {
    fn with_config(config: WebConfig) -> Result<Self, WebError> {
        config.validate()?;
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoWindow)?;
        let host = WebHost::resolve(&document, &config.canvas_selector, config.design)?;
        let dispatcher = Dispatcher::new(microtask);
        let platform = WebPlatform::new(window, document, dispatcher.sink());
        let coordinator = LifecycleCoordinator::new(platform, host, config.overlay)?;
        dispatcher.install(coordinator);
        Ok(Self { dispatcher })
    }

    fn with<R>(&self, f: impl FnOnce(&mut WebCoordinator) -> R) -> Result<R, JsError> {
        self.dispatcher.with(f).ok_or_else(|| js_err(WebError::Busy))
    }
}

impl Drop for OverlayPlayer {
    fn drop(&mut self) {
        drop(self.dispatcher.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(state_name(MediaSessionState::Faulted), "faulted");
        assert_eq!(phase_name(Phase::WaitingForGesture), "waiting_for_gesture");
    }

    #[test]
    fn errors_render() {
        assert_eq!(
            WebError::CanvasMissing("#game".into()).to_string(),
            "canvas not found: #game"
        );
        let err: WebError = ConfigError::Invalid("x".into()).into();
        assert_eq!(err.to_string(), "invalid config: x");
    }
}
