// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end behaviour of the lifecycle coordinator against recording fakes.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use scrim_core::{
    ActivationMode, Event, FaultRecord, LifecycleCoordinator, MediaSessionState, OverlayConfig,
    OverlayError, OverlayRect, PageEvent, Phase, SessionEvent, SessionId, Strategy, StreamUrl,
};
use scrim_dry_tests::{init_test_logging, EngineCall, FakeHost, FakePlatform, ListenerOwner};

type Coordinator = LifecycleCoordinator<FakePlatform, FakeHost>;

const URL: &str = "https://cdn.example.test/live/index.m3u8";

fn config() -> OverlayConfig {
    OverlayConfig {
        stream_url: URL.into(),
        ..OverlayConfig::default()
    }
}

fn gated() -> OverlayConfig {
    OverlayConfig {
        activation: ActivationMode::GestureGated,
        ..config()
    }
}

fn build(platform: &FakePlatform, host: &FakeHost, config: OverlayConfig) -> Coordinator {
    init_test_logging();
    LifecycleCoordinator::new(platform.clone(), host.clone(), config).expect("valid config")
}

fn session(c: &Coordinator) -> SessionId {
    c.playback().session().expect("running session")
}

fn fault(kind: &str) -> SessionEvent {
    SessionEvent::Fault(FaultRecord::from_engine(kind, "fragLoadError", true))
}

#[test]
fn eager_activation_creates_attaches_and_places() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());

    c.activate();

    assert_eq!(c.phase(), Phase::Active);
    assert_eq!(c.state(), MediaSessionState::Created);
    assert_eq!(c.playback().strategy(), Some(Strategy::ExternalEngine));
    assert_eq!(platform.surfaces_created(), 1);
    assert_eq!(
        platform.engine_calls(),
        vec![EngineCall::LoadSource(URL.into()), EngineCall::AttachMedia(1)]
    );
    assert_eq!(
        c.surfaces().last_rect(),
        Some(OverlayRect::new(570.0, 375.0, 300.0, 150.0))
    );
    for event in PageEvent::VIEWPORT {
        assert!(platform.has_page_listener(event));
    }
    assert!(!platform.has_page_listener(PageEvent::FirstGesture));
}

#[test]
fn new_surface_gets_configured_style() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let styles = platform.styles();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0], c.config().surface);
    assert_eq!(styles[0].background, "black");
}

#[test]
fn each_viewport_change_recomputes_and_applies_once() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());
    c.activate();

    for event in PageEvent::VIEWPORT {
        let reads = host.viewport_reads();
        let applies = platform.apply_count();
        c.handle(Event::Page(event));
        assert_eq!(host.viewport_reads(), reads + 1);
        assert_eq!(platform.apply_count(), applies + 1);
    }
}

#[test]
fn repeated_identical_changes_do_not_drift() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    c.handle(Event::Page(PageEvent::Resize));
    c.handle(Event::Page(PageEvent::Resize));
    let rects = platform.rects();
    let n = rects.len();
    assert_eq!(rects[n - 1], rects[n - 2]);
}

#[test]
fn overlay_follows_host_object() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());
    c.activate();

    host.set_object(Some(scrim_core::ObjectTransform::new(0.0, 100.0, 200.0, 100.0)));
    c.handle(Event::Page(PageEvent::OrientationChange));

    let rect = c.surfaces().last_rect().unwrap();
    assert_eq!(rect.top, 375.0 - 150.0);
}

#[test]
fn unresolvable_viewport_skips_the_frame() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());
    c.activate();
    let applies = platform.apply_count();

    host.set_viewport(None);
    c.handle(Event::Page(PageEvent::Resize));

    assert_eq!(platform.apply_count(), applies);
    assert_eq!(c.reposition(), None);
    assert_eq!(c.phase(), Phase::Active);
}

#[test]
fn gesture_gated_waits_for_first_interaction() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, gated());

    c.activate();
    assert_eq!(c.phase(), Phase::WaitingForGesture);
    assert_eq!(c.state(), MediaSessionState::Uncreated);
    assert_eq!(platform.surfaces_created(), 0);
    assert!(platform.has_page_listener(PageEvent::Resize));
    assert!(platform.has_page_listener(PageEvent::FirstGesture));

    // Viewport changes before the gesture touch nothing.
    c.handle(Event::Page(PageEvent::Resize));
    assert_eq!(host.viewport_reads(), 0);
    assert_eq!(platform.apply_count(), 0);

    c.handle(Event::Page(PageEvent::FirstGesture));
    assert_eq!(c.phase(), Phase::Active);
    assert_eq!(c.state(), MediaSessionState::Created);
    assert_eq!(platform.surfaces_created(), 1);
    assert!(!platform.has_page_listener(PageEvent::FirstGesture));

    c.handle(Event::Page(PageEvent::FirstGesture));
    assert_eq!(platform.surfaces_created(), 1);
}

#[test]
fn manifest_parsed_plays_exactly_once() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    c.handle(Event::Session(id, SessionEvent::ManifestParsed));

    assert_eq!(platform.plays(), vec![id]);
    assert_eq!(c.state(), MediaSessionState::Playing);
    assert!(!c.playback().is_degraded());
}

#[test]
fn native_strategy_when_engine_missing_but_element_can_play() {
    let platform = FakePlatform::with_native();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    assert_eq!(c.playback().strategy(), Some(Strategy::Native));
    assert_eq!(platform.engines_created(), 0);
    assert_eq!(platform.sources(), vec![URL.to_string()]);
    assert!(platform
        .live_listeners()
        .contains(&ListenerOwner::Surface(scrim_core::SurfaceEvent::LoadedMetadata, id)));

    c.handle(Event::Session(id, SessionEvent::MediaAttached));
    assert_eq!(c.state(), MediaSessionState::Attached);

    c.handle(Event::Session(id, SessionEvent::MetadataLoaded));
    assert_eq!(platform.plays().len(), 1);
    assert_eq!(c.state(), MediaSessionState::Playing);

    // Engine-only events do not apply to a native session.
    c.handle(Event::Session(id, SessionEvent::ManifestParsed));
    assert_eq!(platform.plays().len(), 1);
}

#[test]
fn unsupported_platform_leaves_black_surface_without_session() {
    let platform = FakePlatform::new();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();

    assert_eq!(c.state(), MediaSessionState::Created);
    assert_eq!(c.playback().strategy(), None);
    assert_eq!(platform.surfaces_live(), 1);
    assert!(platform.plays().is_empty());
    assert!(platform
        .live_listeners()
        .iter()
        .all(|o| matches!(o, ListenerOwner::Page(_))));
}

#[test]
fn surface_creation_failure_is_logged_not_raised() {
    let platform = FakePlatform::with_engine();
    platform.set_fail_surface(true);
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());
    c.activate();

    assert_eq!(c.phase(), Phase::Active);
    assert_eq!(c.state(), MediaSessionState::Uncreated);
    assert_eq!(platform.engines_created(), 0);

    c.handle(Event::Page(PageEvent::Resize));
    assert_eq!(host.viewport_reads(), 0);
}

#[test]
fn synchronous_play_rejection_is_swallowed() {
    let platform = FakePlatform::with_engine();
    platform.set_reject_play(true);
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    c.handle(Event::Session(id, SessionEvent::ManifestParsed));

    assert_eq!(c.state(), MediaSessionState::Playing);
    assert!(c.playback().is_degraded());
    assert!(matches!(
        c.playback().last_report(),
        Some(OverlayError::PlaybackRejected(_))
    ));
    assert_eq!(platform.surfaces_live(), 1);
}

#[test]
fn asynchronous_play_rejection_is_swallowed() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    c.handle(Event::Session(id, SessionEvent::ManifestParsed));
    c.handle(Event::Session(
        id,
        SessionEvent::PlayRejected("NotAllowedError".into()),
    ));

    assert_eq!(c.state(), MediaSessionState::Playing);
    assert!(c.playback().is_degraded());
}

#[test]
fn network_fault_reloads_once_without_new_surface() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);
    c.handle(Event::Session(id, SessionEvent::ManifestParsed));

    c.handle(Event::Session(id, fault("networkError")));

    assert_eq!(platform.engine_call_count(&EngineCall::StartLoad), 1);
    assert_eq!(platform.engine_call_count(&EngineCall::Destroy), 0);
    assert_eq!(platform.surfaces_created(), 1);
    assert_eq!(c.state(), MediaSessionState::Faulted);
    assert!(matches!(
        c.playback().last_report(),
        Some(OverlayError::StreamFault(scrim_core::FaultCategory::Network))
    ));

    c.handle(Event::Session(id, SessionEvent::Playing));
    assert_eq!(c.state(), MediaSessionState::Playing);
}

#[test]
fn network_faults_retry_indefinitely_by_default() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    for _ in 0..50 {
        c.handle(Event::Session(id, fault("networkError")));
    }

    assert_eq!(platform.engine_call_count(&EngineCall::StartLoad), 50);
    assert_eq!(c.state(), MediaSessionState::Faulted);
}

#[test]
fn media_fault_recovers_media() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let id = session(&c);

    c.handle(Event::Session(id, fault("mediaError")));

    assert_eq!(platform.engine_call_count(&EngineCall::RecoverMediaError), 1);
    assert_eq!(platform.engine_call_count(&EngineCall::StartLoad), 0);
}

#[test]
fn unclassified_fault_destroys_session_and_silences_viewport() {
    let platform = FakePlatform::with_engine();
    let host = FakeHost::landscape();
    let mut c = build(&platform, &host, config());
    c.activate();
    let id = session(&c);
    c.handle(Event::Session(id, SessionEvent::ManifestParsed));

    c.handle(Event::Session(id, fault("keySystemError")));

    assert_eq!(platform.engine_call_count(&EngineCall::Destroy), 1);
    assert_eq!(c.state(), MediaSessionState::Destroyed);
    assert_eq!(platform.surfaces_live(), 0);
    assert!(platform
        .live_listeners()
        .iter()
        .all(|o| matches!(o, ListenerOwner::Page(_))));

    let reads = host.viewport_reads();
    let applies = platform.apply_count();
    c.handle(Event::Page(PageEvent::Resize));
    assert_eq!(host.viewport_reads(), reads);
    assert_eq!(platform.apply_count(), applies);

    // Late events for the dead session are dropped.
    c.handle(Event::Session(id, SessionEvent::ManifestParsed));
    assert_eq!(platform.plays().len(), 1);
}

#[test]
fn recovery_ceiling_escalates_to_teardown() {
    let platform = FakePlatform::with_engine();
    let mut cfg = config();
    cfg.recovery.max_attempts = Some(2);
    let mut c = build(&platform, &FakeHost::landscape(), cfg);
    c.activate();
    let id = session(&c);

    c.handle(Event::Session(id, fault("networkError")));
    c.handle(Event::Session(id, fault("networkError")));
    assert_eq!(c.state(), MediaSessionState::Faulted);
    c.handle(Event::Session(id, fault("networkError")));

    assert_eq!(platform.engine_call_count(&EngineCall::StartLoad), 2);
    assert_eq!(platform.engine_call_count(&EngineCall::Destroy), 1);
    assert_eq!(c.state(), MediaSessionState::Destroyed);
}

#[test]
fn playing_resets_the_recovery_ceiling() {
    let platform = FakePlatform::with_engine();
    let mut cfg = config();
    cfg.recovery.max_attempts = Some(1);
    let mut c = build(&platform, &FakeHost::landscape(), cfg);
    c.activate();
    let id = session(&c);

    for _ in 0..3 {
        c.handle(Event::Session(id, fault("mediaError")));
        c.handle(Event::Session(id, SessionEvent::Playing));
    }

    assert_eq!(platform.engine_call_count(&EngineCall::RecoverMediaError), 3);
    assert_eq!(c.state(), MediaSessionState::Playing);
}

#[test]
fn deactivate_unsubscribes_everything_and_is_repeatable() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    assert!(!platform.live_listeners().is_empty());

    c.deactivate();
    c.deactivate();

    assert_eq!(c.phase(), Phase::Deactivated);
    assert_eq!(c.state(), MediaSessionState::Destroyed);
    assert!(platform.live_listeners().is_empty());
    assert_eq!(platform.surfaces_live(), 0);
    assert_eq!(platform.engine_call_count(&EngineCall::Destroy), 1);
}

#[test]
fn deactivate_before_gesture_is_tolerated() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), gated());
    c.activate();
    c.deactivate();

    assert!(platform.live_listeners().is_empty());
    assert_eq!(platform.surfaces_created(), 0);
    assert_eq!(c.state(), MediaSessionState::Uncreated);

    // The gesture listener is gone, but even a stray delivery changes nothing.
    c.handle(Event::Page(PageEvent::FirstGesture));
    assert_eq!(platform.surfaces_created(), 0);
}

#[test]
fn deactivate_without_activation_is_noop() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.deactivate();
    assert_eq!(c.phase(), Phase::Idle);
}

#[test]
fn dropping_the_coordinator_tears_down() {
    let platform = FakePlatform::with_engine();
    {
        let mut c = build(&platform, &FakeHost::landscape(), config());
        c.activate();
    }
    assert!(platform.live_listeners().is_empty());
    assert_eq!(platform.surfaces_live(), 0);
}

#[test]
fn reactivation_after_teardown_starts_fresh() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let first = session(&c);
    c.deactivate();
    c.activate();
    let second = session(&c);

    assert_ne!(first, second);
    assert_eq!(c.state(), MediaSessionState::Created);

    c.handle(Event::Session(first, SessionEvent::MediaAttached));
    assert_eq!(c.state(), MediaSessionState::Created);
    c.handle(Event::Session(second, SessionEvent::MediaAttached));
    assert_eq!(c.state(), MediaSessionState::Attached);
    assert_eq!(platform.surfaces_created(), 2);
    assert_eq!(platform.surfaces_live(), 1);
}

#[test]
fn switch_stream_replaces_the_session() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), config());
    c.activate();
    let old = session(&c);
    c.handle(Event::Session(old, SessionEvent::ManifestParsed));

    let next = "https://cdn.example.test/other/index.m3u8";
    c.switch_stream(StreamUrl::new(next).unwrap());
    let new = session(&c);

    assert_ne!(old, new);
    assert_eq!(c.url().as_str(), next);
    assert_eq!(c.state(), MediaSessionState::Created);
    assert_eq!(platform.engines_created(), 2);
    assert_eq!(platform.engine_call_count(&EngineCall::Destroy), 1);
    assert!(platform
        .engine_calls()
        .contains(&EngineCall::LoadSource(next.into())));
    assert_eq!(platform.surfaces_live(), 1);
    assert!(c.surfaces().last_rect().is_some_and(|r| !r.is_empty()));

    // The old session's late events do not reach the new one.
    c.handle(Event::Session(old, SessionEvent::ManifestParsed));
    assert_eq!(platform.plays(), vec![old]);
}

#[test]
fn switch_stream_before_activation_only_changes_url() {
    let platform = FakePlatform::with_engine();
    let mut c = build(&platform, &FakeHost::landscape(), gated());
    c.activate();
    let next = "https://cdn.example.test/other/index.m3u8";
    c.switch_stream(StreamUrl::new(next).unwrap());

    assert_eq!(platform.surfaces_created(), 0);
    c.handle(Event::Page(PageEvent::FirstGesture));
    assert_eq!(
        platform.engine_calls().first(),
        Some(&EngineCall::LoadSource(next.into()))
    );
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = OverlayConfig {
        stream_url: "  ".into(),
        ..OverlayConfig::default()
    };
    let err = LifecycleCoordinator::new(FakePlatform::new(), FakeHost::new(), cfg);
    assert!(matches!(err, Err(OverlayError::Config(_))));
}
