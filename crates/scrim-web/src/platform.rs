// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! DOM-backed platform: `<video>` surface, hls.js engine, page listeners.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use js_sys::Reflect;
use scrim_core::{
    AdaptiveEngine, EngineEvent, Event, FaultRecord, ListenerId, MediaPlatform, OverlayRect,
    PageEvent, PlayableSurface, PortError, SessionEvent, SessionId, StreamUrl, SurfaceEvent,
    SurfaceFactory, SurfaceStyle,
};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CssStyleDeclaration, Document, EventTarget, HtmlVideoElement, Window};

use crate::dispatch::EventSink;
use crate::hls;

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn field(data: &JsValue, key: &str) -> JsValue {
    Reflect::get(data, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

/// Classify an hls.js `ERROR` payload (`{ type, details, fatal }`).
fn fault_from(data: &JsValue) -> FaultRecord {
    let kind = field(data, "type").as_string().unwrap_or_default();
    let details = field(data, "details").as_string().unwrap_or_default();
    let fatal = field(data, "fatal").as_bool().unwrap_or(false);
    FaultRecord::from_engine(&kind, details, fatal)
}

/// Shared listener id counter.
#[derive(Clone, Default)]
struct ListenerIds(Rc<Cell<u64>>);

impl ListenerIds {
    fn next(&self) -> ListenerId {
        let id = self.0.get().wrapping_add(1);
        self.0.set(id);
        ListenerId(id)
    }
}

type DomCallback = Closure<dyn FnMut(web_sys::Event)>;

const RESIZE: &[&str] = &["resize"];
const ORIENTATION: &[&str] = &["orientationchange"];
const FULLSCREEN: &[&str] = &["fullscreenchange", "webkitfullscreenchange"];
const GESTURE: &[&str] = &["pointerdown", "keydown", "touchend"];
const LOAD_START: &[&str] = &["loadstart"];
const LOADED_METADATA: &[&str] = &["loadedmetadata"];
const PLAYING: &[&str] = &["playing"];

/// One DOM callback registered under one or more event names.
struct DomListener {
    target: EventTarget,
    names: &'static [&'static str],
    callback: DomCallback,
}

impl DomListener {
    fn attach(target: EventTarget, names: &'static [&'static str], callback: DomCallback) -> Self {
        for name in names {
            if let Err(err) =
                target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            {
                warn!(event = name, err = %describe(&err), "addEventListener failed");
            }
        }
        Self {
            target,
            names,
            callback,
        }
    }

    fn detach(self) {
        for name in self.names {
            if let Err(err) = self
                .target
                .remove_event_listener_with_callback(name, self.callback.as_ref().unchecked_ref())
            {
                debug!(event = name, err = %describe(&err), "removeEventListener failed");
            }
        }
    }
}

// ─── Platform ────────────────────────────────────────────────────────────────

/// [`MediaPlatform`] over the live document.
pub struct WebPlatform {
    window: Window,
    document: Document,
    sink: EventSink,
    ids: ListenerIds,
    page: BTreeMap<ListenerId, DomListener>,
}

impl WebPlatform {
    /// Platform posting its events to `sink`.
    pub fn new(window: Window, document: Document, sink: EventSink) -> Self {
        Self {
            window,
            document,
            sink,
            ids: ListenerIds::default(),
            page: BTreeMap::new(),
        }
    }

    fn page_binding(&self, event: PageEvent) -> (EventTarget, &'static [&'static str]) {
        let window = || EventTarget::from(self.window.clone());
        let document = || EventTarget::from(self.document.clone());
        match event {
            PageEvent::Resize => (window(), RESIZE),
            PageEvent::OrientationChange => (window(), ORIENTATION),
            PageEvent::FullscreenChange => (document(), FULLSCREEN),
            PageEvent::FirstGesture => (document(), GESTURE),
        }
    }

    fn build_video(&self, style: &SurfaceStyle) -> Result<HtmlVideoElement, PortError> {
        let backend = |err: JsValue| PortError::Backend(describe(&err));
        let video: HtmlVideoElement = self
            .document
            .create_element("video")
            .map_err(backend)?
            .dyn_into()
            .map_err(|_| PortError::Backend("created element is not a video".into()))?;

        let z_index = style.z_index.to_string();
        let css = video.style();
        for (name, value) in [
            ("position", "fixed"),
            ("pointer-events", "none"),
            ("z-index", z_index.as_str()),
            ("background-color", style.background.as_str()),
            ("object-fit", style.object_fit.as_str()),
            ("left", "0px"),
            ("top", "0px"),
            ("width", "0px"),
            ("height", "0px"),
        ] {
            css.set_property(name, value).map_err(backend)?;
        }

        video.set_muted(style.muted);
        video.set_autoplay(style.autoplay);
        video.set_controls(style.controls);
        if style.plays_inline {
            video.set_attribute("playsinline", "").map_err(backend)?;
        }

        self.document
            .body()
            .ok_or_else(|| PortError::Unavailable("no document body".into()))?
            .append_child(&video)
            .map_err(backend)?;
        Ok(video)
    }
}

impl SurfaceFactory for WebPlatform {
    type Surface = WebSurface;

    fn create_surface(&mut self, style: &SurfaceStyle) -> Result<WebSurface, PortError> {
        let video = self.build_video(style)?;
        debug!("video element attached");
        Ok(WebSurface {
            css: video.style(),
            video,
            sink: self.sink.clone(),
            ids: self.ids.clone(),
            listeners: BTreeMap::new(),
            scratch: String::with_capacity(SCRATCH_CAPACITY),
            detached: false,
        })
    }
}

impl MediaPlatform for WebPlatform {
    type Engine = WebEngine;

    fn engine_supported(&self) -> bool {
        hls::supported()
    }

    fn create_engine(&mut self) -> Result<WebEngine, PortError> {
        let hls = hls::create().map_err(|err| PortError::Unavailable(describe(&err)))?;
        Ok(WebEngine {
            hls,
            sink: self.sink.clone(),
            ids: self.ids.clone(),
            handlers: BTreeMap::new(),
            destroyed: false,
        })
    }

    fn listen(&mut self, event: PageEvent) -> ListenerId {
        let (target, names) = self.page_binding(event);
        let sink = self.sink.clone();
        let callback = DomCallback::new(move |_: web_sys::Event| sink.send(Event::Page(event)));
        let id = self.ids.next();
        self.page
            .insert(id, DomListener::attach(target, names, callback));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        if let Some(listener) = self.page.remove(&id) {
            listener.detach();
        }
    }
}

impl Drop for WebPlatform {
    fn drop(&mut self) {
        for (_, listener) in std::mem::take(&mut self.page) {
            listener.detach();
        }
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// Largest pixel magnitude written to a style property.
const MAX_CSS_PX: f64 = 1.0e7;
/// Fits `-10000000.00px`.
const SCRATCH_CAPACITY: usize = 24;

/// Overwrite `buf` with `value` as a CSS pixel length, clamped so the text
/// always fits [`SCRATCH_CAPACITY`].
fn write_px(buf: &mut String, value: f64) {
    buf.clear();
    let value = value.clamp(-MAX_CSS_PX, MAX_CSS_PX);
    let _ = write!(buf, "{value:.2}px");
}

/// The overlay `<video>` element.
pub struct WebSurface {
    video: HtmlVideoElement,
    css: CssStyleDeclaration,
    sink: EventSink,
    ids: ListenerIds,
    listeners: BTreeMap<ListenerId, DomListener>,
    scratch: String,
    detached: bool,
}

impl WebSurface {
    /// The underlying element.
    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl PlayableSurface for WebSurface {
    fn apply_rect(&mut self, rect: &OverlayRect) {
        for (name, value) in [
            ("left", rect.left),
            ("top", rect.top),
            ("width", rect.width),
            ("height", rect.height),
        ] {
            write_px(&mut self.scratch, value);
            if let Err(err) = self.css.set_property(name, &self.scratch) {
                debug!(property = name, err = %describe(&err), "style update failed");
            }
        }
    }

    fn set_source(&mut self, url: &StreamUrl) {
        self.video.set_src(url.as_str());
    }

    fn can_play_type(&self, mime: &str) -> bool {
        !self.video.can_play_type(mime).is_empty()
    }

    fn play(&mut self, session: SessionId) -> Result<(), PortError> {
        let promise = self
            .video
            .play()
            .map_err(|err| PortError::Backend(describe(&err)))?;
        let sink = self.sink.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(reason) = JsFuture::from(promise).await {
                sink.send(Event::Session(
                    session,
                    SessionEvent::PlayRejected(describe(&reason)),
                ));
            }
        });
        Ok(())
    }

    fn listen(&mut self, event: SurfaceEvent, session: SessionId) -> ListenerId {
        let (names, delivered) = match event {
            SurfaceEvent::LoadStart => (LOAD_START, SessionEvent::MediaAttached),
            SurfaceEvent::LoadedMetadata => (LOADED_METADATA, SessionEvent::MetadataLoaded),
            SurfaceEvent::Playing => (PLAYING, SessionEvent::Playing),
        };
        let sink = self.sink.clone();
        let callback = DomCallback::new(move |_: web_sys::Event| {
            sink.send(Event::Session(session, delivered.clone()));
        });
        let id = self.ids.next();
        let target = EventTarget::from(self.video.clone());
        self.listeners
            .insert(id, DomListener::attach(target, names, callback));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        if let Some(listener) = self.listeners.remove(&id) {
            listener.detach();
        }
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        for (_, listener) in std::mem::take(&mut self.listeners) {
            listener.detach();
        }
        self.video.remove();
        debug!("video element removed");
    }
}

impl Drop for WebSurface {
    fn drop(&mut self) {
        self.detach();
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

type EngineCallback = Closure<dyn FnMut(JsValue, JsValue)>;

/// One hls.js instance.
pub struct WebEngine {
    hls: JsValue,
    sink: EventSink,
    ids: ListenerIds,
    handlers: BTreeMap<ListenerId, (&'static str, EngineCallback)>,
    destroyed: bool,
}

impl AdaptiveEngine<WebSurface> for WebEngine {
    fn load_source(&mut self, url: &StreamUrl) {
        hls::load_source(&self.hls, url.as_str());
    }

    fn attach_media(&mut self, surface: &WebSurface) {
        hls::attach_media(&self.hls, &surface.video);
    }

    fn subscribe(&mut self, event: EngineEvent, session: SessionId) -> ListenerId {
        let sink = self.sink.clone();
        let (name, callback) = match event {
            EngineEvent::MediaAttached => (
                hls::MEDIA_ATTACHED,
                EngineCallback::new(move |_: JsValue, _: JsValue| {
                    sink.send(Event::Session(session, SessionEvent::MediaAttached));
                }),
            ),
            EngineEvent::ManifestParsed => (
                hls::MANIFEST_PARSED,
                EngineCallback::new(move |_: JsValue, _: JsValue| {
                    sink.send(Event::Session(session, SessionEvent::ManifestParsed));
                }),
            ),
            EngineEvent::Error => (
                hls::ERROR,
                EngineCallback::new(move |_: JsValue, data: JsValue| {
                    sink.send(Event::Session(session, SessionEvent::Fault(fault_from(&data))));
                }),
            ),
        };
        hls::on(&self.hls, name, callback.as_ref().unchecked_ref());
        let id = self.ids.next();
        self.handlers.insert(id, (name, callback));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        if let Some((name, callback)) = self.handlers.remove(&id) {
            hls::off(&self.hls, name, callback.as_ref().unchecked_ref());
        }
    }

    fn start_load(&mut self) {
        hls::start_load(&self.hls);
    }

    fn recover_media_error(&mut self) {
        hls::recover_media_error(&self.hls);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for (_, (name, callback)) in std::mem::take(&mut self.handlers) {
            hls::off(&self.hls, name, callback.as_ref().unchecked_ref());
        }
        hls::destroy(&self.hls);
        self.destroyed = true;
        debug!("hls engine destroyed");
    }
}

impl Drop for WebEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_lengths_stay_within_the_scratch_buffer() {
        let mut buf = String::with_capacity(SCRATCH_CAPACITY);
        let capacity = buf.capacity();
        write_px(&mut buf, 570.0);
        assert_eq!(buf, "570.00px");

        for value in [1.0e300, -1.0e300, f64::MAX, -123_456.789] {
            write_px(&mut buf, value);
            assert!(buf.len() <= SCRATCH_CAPACITY, "{buf}");
        }
        write_px(&mut buf, -1.0e300);
        assert_eq!(buf, "-10000000.00px");
        assert_eq!(buf.capacity(), capacity);
    }
}
