// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! hls.js bindings, via `js/hls-bridge.js`.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlVideoElement;

/// `Hls.Events` key for the engine binding to the video element.
pub(crate) const MEDIA_ATTACHED: &str = "MEDIA_ATTACHED";
/// `Hls.Events` key for a parsed manifest.
pub(crate) const MANIFEST_PARSED: &str = "MANIFEST_PARSED";
/// `Hls.Events` key for engine errors.
pub(crate) const ERROR: &str = "ERROR";

#[wasm_bindgen(module = "/js/hls-bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = "hlsSupported")]
    pub(crate) fn supported() -> bool;

    #[wasm_bindgen(catch, js_name = "createHls")]
    pub(crate) fn create() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = "loadSource")]
    pub(crate) fn load_source(hls: &JsValue, url: &str);

    #[wasm_bindgen(js_name = "attachMedia")]
    pub(crate) fn attach_media(hls: &JsValue, video: &HtmlVideoElement);

    #[wasm_bindgen(js_name = "onHls")]
    pub(crate) fn on(hls: &JsValue, event: &str, callback: &Function);

    #[wasm_bindgen(js_name = "offHls")]
    pub(crate) fn off(hls: &JsValue, event: &str, callback: &Function);

    #[wasm_bindgen(js_name = "startLoad")]
    pub(crate) fn start_load(hls: &JsValue);

    #[wasm_bindgen(js_name = "recoverMediaError")]
    pub(crate) fn recover_media_error(hls: &JsValue);

    #[wasm_bindgen(js_name = "destroyHls")]
    pub(crate) fn destroy(hls: &JsValue);
}
