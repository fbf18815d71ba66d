// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recording fakes for the media platform, its surfaces, and engines.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use scrim_core::{
    AdaptiveEngine, EngineEvent, ListenerId, MediaPlatform, OverlayRect, PageEvent,
    PlayableSurface, PortError, SessionId, StreamUrl, SurfaceEvent, SurfaceFactory, SurfaceStyle,
};

/// One call made on a [`FakeEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    /// `load_source(url)`.
    LoadSource(String),
    /// `attach_media(surface)`, with the surface's serial.
    AttachMedia(u32),
    /// `start_load()`.
    StartLoad,
    /// `recover_media_error()`.
    RecoverMediaError,
    /// `destroy()`.
    Destroy,
}

/// Who a live listener belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerOwner {
    /// Registered on the page.
    Page(PageEvent),
    /// Registered on a surface for a session.
    Surface(SurfaceEvent, SessionId),
    /// Registered on an engine for a session.
    Engine(EngineEvent, SessionId),
}

#[derive(Default)]
struct PlatformLog {
    next_listener: u64,
    listeners: BTreeMap<ListenerId, ListenerOwner>,
    engine_supported: bool,
    native_supported: bool,
    fail_surface: bool,
    reject_play: bool,
    surfaces_created: u32,
    surfaces_live: u32,
    styles: Vec<SurfaceStyle>,
    rects: Vec<OverlayRect>,
    sources: Vec<String>,
    plays: Vec<SessionId>,
    engines_created: u32,
    engine_calls: Vec<EngineCall>,
}

impl PlatformLog {
    fn register(&mut self, owner: ListenerOwner) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, owner);
        id
    }
}

/// In-memory [`MediaPlatform`] that records everything done to it.
///
/// Clones share state, so a test can keep one handle while the coordinator
/// owns another.
///
/// # Example
///
/// ```
/// use scrim_dry_tests::FakePlatform;
///
/// let platform = FakePlatform::with_engine();
/// assert_eq!(platform.surfaces_created(), 0);
/// ```
#[derive(Clone, Default)]
pub struct FakePlatform {
    inner: Arc<Mutex<PlatformLog>>,
}

impl FakePlatform {
    /// Platform with neither engine nor native support.
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform where the external engine is usable.
    pub fn with_engine() -> Self {
        let platform = Self::new();
        platform.lock().engine_supported = true;
        platform
    }

    /// Platform where only native playback is usable.
    pub fn with_native() -> Self {
        let platform = Self::new();
        platform.lock().native_supported = true;
        platform
    }

    fn lock(&self) -> MutexGuard<'_, PlatformLog> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make subsequent `create_surface` calls fail.
    pub fn set_fail_surface(&self, fail: bool) {
        self.lock().fail_surface = fail;
    }

    /// Make subsequent `play` calls fail synchronously.
    pub fn set_reject_play(&self, reject: bool) {
        self.lock().reject_play = reject;
    }

    /// Number of surfaces ever created.
    pub fn surfaces_created(&self) -> u32 {
        self.lock().surfaces_created
    }

    /// Number of surfaces created and not yet detached.
    pub fn surfaces_live(&self) -> u32 {
        self.lock().surfaces_live
    }

    /// Styles passed to `create_surface`, in order.
    pub fn styles(&self) -> Vec<SurfaceStyle> {
        self.lock().styles.clone()
    }

    /// Every rectangle applied to any surface, in order.
    pub fn rects(&self) -> Vec<OverlayRect> {
        self.lock().rects.clone()
    }

    /// Number of `apply_rect` calls so far.
    pub fn apply_count(&self) -> usize {
        self.lock().rects.len()
    }

    /// Sources bound natively, in order.
    pub fn sources(&self) -> Vec<String> {
        self.lock().sources.clone()
    }

    /// Sessions `play` was called for, in order.
    pub fn plays(&self) -> Vec<SessionId> {
        self.lock().plays.clone()
    }

    /// Number of engines ever created.
    pub fn engines_created(&self) -> u32 {
        self.lock().engines_created
    }

    /// Every call made on any engine, in order.
    pub fn engine_calls(&self) -> Vec<EngineCall> {
        self.lock().engine_calls.clone()
    }

    /// How many times `call` was made on any engine.
    pub fn engine_call_count(&self, call: &EngineCall) -> usize {
        self.lock().engine_calls.iter().filter(|c| *c == call).count()
    }

    /// Listeners currently registered anywhere.
    pub fn live_listeners(&self) -> Vec<ListenerOwner> {
        self.lock().listeners.values().copied().collect()
    }

    /// Whether a page listener for `event` is registered.
    pub fn has_page_listener(&self, event: PageEvent) -> bool {
        self.lock()
            .listeners
            .values()
            .any(|o| *o == ListenerOwner::Page(event))
    }
}

impl SurfaceFactory for FakePlatform {
    type Surface = FakeSurface;

    fn create_surface(&mut self, style: &SurfaceStyle) -> Result<FakeSurface, PortError> {
        let mut log = self.lock();
        if log.fail_surface {
            return Err(PortError::Unavailable("no document body".into()));
        }
        log.surfaces_created += 1;
        log.surfaces_live += 1;
        log.styles.push(style.clone());
        Ok(FakeSurface {
            serial: log.surfaces_created,
            detached: false,
            inner: Arc::clone(&self.inner),
        })
    }
}

impl MediaPlatform for FakePlatform {
    type Engine = FakeEngine;

    fn engine_supported(&self) -> bool {
        self.lock().engine_supported
    }

    fn create_engine(&mut self) -> Result<FakeEngine, PortError> {
        self.lock().engines_created += 1;
        Ok(FakeEngine {
            destroyed: false,
            inner: Arc::clone(&self.inner),
        })
    }

    fn listen(&mut self, event: PageEvent) -> ListenerId {
        self.lock().register(ListenerOwner::Page(event))
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }
}

/// Surface created by [`FakePlatform`].
pub struct FakeSurface {
    serial: u32,
    detached: bool,
    inner: Arc<Mutex<PlatformLog>>,
}

impl FakeSurface {
    fn lock(&self) -> MutexGuard<'_, PlatformLog> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creation order of this surface (1-based).
    pub fn serial(&self) -> u32 {
        self.serial
    }
}

impl PlayableSurface for FakeSurface {
    fn apply_rect(&mut self, rect: &OverlayRect) {
        self.lock().rects.push(*rect);
    }

    fn set_source(&mut self, url: &StreamUrl) {
        self.lock().sources.push(url.as_str().to_owned());
    }

    fn can_play_type(&self, _mime: &str) -> bool {
        self.lock().native_supported
    }

    fn play(&mut self, session: SessionId) -> Result<(), PortError> {
        let mut log = self.lock();
        log.plays.push(session);
        if log.reject_play {
            return Err(PortError::Backend("NotAllowedError".into()));
        }
        Ok(())
    }

    fn listen(&mut self, event: SurfaceEvent, session: SessionId) -> ListenerId {
        self.lock().register(ListenerOwner::Surface(event, session))
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }

    fn detach(&mut self) {
        if !self.detached {
            self.detached = true;
            self.lock().surfaces_live -= 1;
        }
    }
}

/// Engine created by [`FakePlatform`].
pub struct FakeEngine {
    destroyed: bool,
    inner: Arc<Mutex<PlatformLog>>,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .engine_calls
            .push(call);
    }
}

impl AdaptiveEngine<FakeSurface> for FakeEngine {
    fn load_source(&mut self, url: &StreamUrl) {
        self.record(EngineCall::LoadSource(url.as_str().to_owned()));
    }

    fn attach_media(&mut self, surface: &FakeSurface) {
        self.record(EngineCall::AttachMedia(surface.serial));
    }

    fn subscribe(&mut self, event: EngineEvent, session: SessionId) -> ListenerId {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .register(ListenerOwner::Engine(event, session))
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .remove(&id);
    }

    fn start_load(&mut self) {
        self.record(EngineCall::StartLoad);
    }

    fn recover_media_error(&mut self) {
        self.record(EngineCall::RecoverMediaError);
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.record(EngineCall::Destroy);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let platform = FakePlatform::with_engine();
        let mut handle = platform.clone();
        let mut surface = handle.create_surface(&SurfaceStyle::default()).unwrap();
        surface.apply_rect(&OverlayRect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(platform.apply_count(), 1);
        assert_eq!(platform.surfaces_live(), 1);
        surface.detach();
        surface.detach();
        assert_eq!(platform.surfaces_live(), 0);
    }

    #[test]
    fn unlisten_removes_only_that_listener() {
        let mut platform = FakePlatform::new();
        let a = platform.listen(PageEvent::Resize);
        let _b = platform.listen(PageEvent::FullscreenChange);
        platform.unlisten(a);
        assert!(!platform.has_page_listener(PageEvent::Resize));
        assert!(platform.has_page_listener(PageEvent::FullscreenChange));
    }
}
