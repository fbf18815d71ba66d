// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Scrim crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`host`] - Scriptable host view and viewport fixtures
//! - [`platform`] - Recording platform / surface / engine fakes

pub mod host;
pub mod platform;

pub use host::{centered_object, landscape_viewport, FakeHost};
pub use platform::{EngineCall, FakeEngine, FakePlatform, FakeSurface, ListenerOwner};

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
