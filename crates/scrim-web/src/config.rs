// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Browser configuration: the core overlay config plus host lookup.

use scrim_core::{ConfigError, DesignSize, OverlayConfig};
use serde::{Deserialize, Serialize};

/// Selector used when none is configured.
pub const DEFAULT_CANVAS_SELECTOR: &str = "canvas";

/// Configuration accepted by [`OverlayPlayer`](crate::OverlayPlayer).
///
/// Overlay fields sit at the top level next to the web-only ones:
///
/// ```json
/// { "stream_url": "https://…/index.m3u8", "activation": "gesture_gated",
///   "canvas_selector": "#game", "design": { "width": 960, "height": 640 } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Core overlay settings.
    #[serde(flatten)]
    pub overlay: OverlayConfig,
    /// CSS selector of the host's render canvas.
    pub canvas_selector: String,
    /// Host design resolution.
    pub design: DesignSize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            canvas_selector: DEFAULT_CANVAS_SELECTOR.into(),
            design: DesignSize::new(960.0, 640.0),
        }
    }
}

impl WebConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check everything the overlay and the host lookup depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.overlay.validate()?;
        if self.canvas_selector.trim().is_empty() {
            return Err(ConfigError::Invalid("canvas_selector is empty".into()));
        }
        let DesignSize { width, height } = self.design;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "design size must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scrim_core::ActivationMode;

    #[test]
    fn empty_object_is_default() {
        let cfg = WebConfig::from_json("{}").unwrap();
        assert_eq!(cfg, WebConfig::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overlay_fields_are_flattened() {
        let cfg = WebConfig::from_json(
            r##"{"stream_url":"https://a.test/x.m3u8","activation":"gesture_gated",
                "canvas_selector":"#game","design":{"width":1280,"height":720}}"##,
        )
        .unwrap();
        assert_eq!(cfg.overlay.stream_url, "https://a.test/x.m3u8");
        assert_eq!(cfg.overlay.activation, ActivationMode::GestureGated);
        assert_eq!(cfg.canvas_selector, "#game");
        assert_eq!(cfg.design, DesignSize::new(1280.0, 720.0));
    }

    #[test]
    fn rejects_bad_design_and_selector() {
        let cfg = WebConfig {
            design: DesignSize::new(0.0, 640.0),
            ..WebConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let cfg = WebConfig {
            canvas_selector: " ".into(),
            ..WebConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn overlay_validation_is_included() {
        let mut cfg = WebConfig::default();
        cfg.overlay.recovery.max_attempts = Some(0);
        assert!(cfg.validate().is_err());
    }
}
