// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stream identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// MIME type browsers report for natively playable HLS.
pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// Manifest URL of a stream. Opaque to the core; immutable for a session's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamUrl(String);

impl StreamUrl {
    /// Wrap a manifest URL. Blank strings are rejected.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("stream url is empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The URL as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StreamUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StreamUrl> for String {
    fn from(value: StreamUrl) -> Self {
        value.0
    }
}

impl AsRef<str> for StreamUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_is_rejected() {
        assert!(StreamUrl::new("   ").is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let url = StreamUrl::new(" https://example.test/live.m3u8\n").unwrap();
        assert_eq!(url.as_str(), "https://example.test/live.m3u8");
    }
}
