// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stream fault classification and recovery decisions.
//!
//! Raw engine errors are classified into a closed [`FaultCategory`] at the
//! adapter boundary ([`FaultRecord::from_engine`]). Past that point nothing
//! inspects the engine's error strings.

use core::fmt;

use crate::config::RecoveryPolicy;

/// Error type string the adaptive engine uses for network faults.
pub const ENGINE_NETWORK_ERROR: &str = "networkError";
/// Error type string the adaptive engine uses for media (decode) faults.
pub const ENGINE_MEDIA_ERROR: &str = "mediaError";

/// Classification bucket driving recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    /// Manifest or segment fetch failed.
    Network,
    /// Decode or buffer corruption.
    Media,
    /// Anything else; not recoverable.
    Fatal,
}

impl FaultCategory {
    /// Classify the engine's error type string.
    pub fn classify(kind: &str) -> Self {
        match kind {
            ENGINE_NETWORK_ERROR => Self::Network,
            ENGINE_MEDIA_ERROR => Self::Media,
            _ => Self::Fatal,
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::Media => "media",
            Self::Fatal => "fatal",
        })
    }
}

/// One classified fault. Transient: built by the adapter, consumed once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultRecord {
    /// Bucket.
    pub category: FaultCategory,
    /// Engine-provided detail for logs only.
    pub detail: String,
    /// Whether the engine itself flagged the fault as fatal.
    pub engine_fatal: bool,
}

impl FaultRecord {
    /// Classify a raw engine error (`type`, `details`, `fatal`).
    pub fn from_engine(kind: &str, detail: impl Into<String>, engine_fatal: bool) -> Self {
        Self {
            category: FaultCategory::classify(kind),
            detail: detail.into(),
            engine_fatal,
        }
    }
}

/// Command sent back to the engine in response to a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecoveryCommand {
    /// `startLoad()`: refetch from the source.
    ReloadSource,
    /// `recoverMediaError()`: reset the media pipeline.
    RecoverMedia,
    /// `destroy()`: give up on the session.
    DestroySession,
}

impl RecoveryCommand {
    /// Fixed mapping from category to command.
    pub const fn for_category(category: FaultCategory) -> Self {
        match category {
            FaultCategory::Network => Self::ReloadSource,
            FaultCategory::Media => Self::RecoverMedia,
            FaultCategory::Fatal => Self::DestroySession,
        }
    }
}

/// Per-session recovery bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct RecoveryController {
    policy: RecoveryPolicy,
    network_attempts: u32,
    media_attempts: u32,
}

impl RecoveryController {
    /// Controller enforcing `policy`.
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self {
            policy,
            network_attempts: 0,
            media_attempts: 0,
        }
    }

    /// Decide the command for `record`, counting the attempt.
    ///
    /// Without a ceiling this is exactly [`RecoveryCommand::for_category`].
    pub fn decide(&mut self, record: &FaultRecord) -> RecoveryCommand {
        let attempts = match record.category {
            FaultCategory::Network => &mut self.network_attempts,
            FaultCategory::Media => &mut self.media_attempts,
            FaultCategory::Fatal => return RecoveryCommand::DestroySession,
        };
        *attempts = attempts.saturating_add(1);
        match self.policy.max_attempts {
            Some(max) if *attempts > max => RecoveryCommand::DestroySession,
            _ => RecoveryCommand::for_category(record.category),
        }
    }

    /// Attempts counted for `category` since the last reset.
    pub fn attempts(&self, category: FaultCategory) -> u32 {
        match category {
            FaultCategory::Network => self.network_attempts,
            FaultCategory::Media => self.media_attempts,
            FaultCategory::Fatal => 0,
        }
    }

    /// Forget past attempts (playback resumed).
    pub fn reset(&mut self) {
        self.network_attempts = 0;
        self.media_attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_total() {
        assert_eq!(FaultCategory::classify("networkError"), FaultCategory::Network);
        assert_eq!(FaultCategory::classify("mediaError"), FaultCategory::Media);
        for other in ["keySystemError", "muxError", "otherError", "", "NETWORK_ERROR"] {
            assert_eq!(FaultCategory::classify(other), FaultCategory::Fatal);
        }
    }

    #[test]
    fn same_category_same_command() {
        let mut c = RecoveryController::default();
        for _ in 0..100 {
            let net = FaultRecord::from_engine("networkError", "levelLoadError", false);
            let media = FaultRecord::from_engine("mediaError", "bufferStalledError", false);
            let other = FaultRecord::from_engine("muxError", "x", true);
            assert_eq!(c.decide(&net), RecoveryCommand::ReloadSource);
            assert_eq!(c.decide(&media), RecoveryCommand::RecoverMedia);
            assert_eq!(c.decide(&other), RecoveryCommand::DestroySession);
        }
    }

    #[test]
    fn ceiling_escalates_after_max_attempts() {
        let mut c = RecoveryController::new(RecoveryPolicy {
            max_attempts: Some(2),
        });
        let net = FaultRecord::from_engine("networkError", "", false);
        assert_eq!(c.decide(&net), RecoveryCommand::ReloadSource);
        assert_eq!(c.decide(&net), RecoveryCommand::ReloadSource);
        assert_eq!(c.decide(&net), RecoveryCommand::DestroySession);
    }

    #[test]
    fn categories_count_independently_and_reset() {
        let mut c = RecoveryController::new(RecoveryPolicy {
            max_attempts: Some(1),
        });
        let net = FaultRecord::from_engine("networkError", "", false);
        let media = FaultRecord::from_engine("mediaError", "", false);
        assert_eq!(c.decide(&net), RecoveryCommand::ReloadSource);
        assert_eq!(c.decide(&media), RecoveryCommand::RecoverMedia);
        c.reset();
        assert_eq!(c.attempts(FaultCategory::Network), 0);
        assert_eq!(c.decide(&net), RecoveryCommand::ReloadSource);
    }
}
