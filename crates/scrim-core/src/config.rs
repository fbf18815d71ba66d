// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Overlay configuration and its JSON form.

use scrim_geom::{AnchorOrigin, FitPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stream::{StreamUrl, HLS_MIME};

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A value parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// When the overlay is allowed to create its surface and start playing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMode {
    /// Create and play as soon as the coordinator activates.
    #[default]
    Eager,
    /// Wait for the first user interaction (browser autoplay policy).
    GestureGated,
}

/// Presentation flags applied to a freshly created surface.
///
/// Positioning is always fixed and the surface never takes pointer input;
/// those are not configurable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceStyle {
    /// Stacking order above the host canvas.
    pub z_index: i32,
    /// CSS background; opaque so an empty frame never flashes through.
    pub background: String,
    /// CSS `object-fit` for the media inside the surface.
    pub object_fit: String,
    /// Start muted (mobile browsers only autoplay muted media).
    pub muted: bool,
    /// Set the `autoplay` attribute.
    pub autoplay: bool,
    /// Show native player controls.
    pub controls: bool,
    /// Play inline on iOS instead of going fullscreen.
    pub plays_inline: bool,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            z_index: 999,
            background: "black".into(),
            object_fit: "cover".into(),
            muted: true,
            autoplay: true,
            controls: true,
            plays_inline: true,
        }
    }
}

/// Ceiling on consecutive recovery attempts per fault category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryPolicy {
    /// `None` retries forever. `Some(n)` escalates the `n+1`-th consecutive
    /// fault of one category to a session teardown.
    pub max_attempts: Option<u32>,
}

/// Full overlay configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Manifest URL of the stream to play.
    pub stream_url: String,
    /// Eager or gesture-gated activation.
    pub activation: ActivationMode,
    /// Cover or Fit scaling of the host viewport.
    pub fit: FitPolicy,
    /// Where the host puts world (0, 0).
    pub origin: AnchorOrigin,
    /// MIME type probed for native playback.
    pub native_mime: String,
    /// Surface presentation flags.
    pub surface: SurfaceStyle,
    /// Fault recovery ceiling.
    pub recovery: RecoveryPolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stream_url: "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8".into(),
            activation: ActivationMode::default(),
            fit: FitPolicy::default(),
            origin: AnchorOrigin::default(),
            native_mime: HLS_MIME.into(),
            surface: SurfaceStyle::default(),
            recovery: RecoveryPolicy::default(),
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stream_url()?;
        if self.native_mime.trim().is_empty() {
            return Err(ConfigError::Invalid("native_mime is empty".into()));
        }
        if self.recovery.max_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "recovery.max_attempts must be at least 1 (omit it to retry forever)".into(),
            ));
        }
        Ok(())
    }

    /// The configured stream as a [`StreamUrl`].
    pub fn stream_url(&self) -> Result<StreamUrl, ConfigError> {
        StreamUrl::new(self.stream_url.as_str())
    }
}
