// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host view backed by the render canvas.

use scrim_core::{DesignSize, HostView, ObjectTransform, ScreenRect, ViewportSnapshot};
use web_sys::{Document, Element};

use crate::platform::describe;
use crate::WebError;

/// The host's canvas plus the object transform the host last pushed.
///
/// The canvas is resolved once; the object transform arrives from JS through
/// [`OverlayPlayer::set_object_transform`](crate::OverlayPlayer::set_object_transform).
pub struct WebHost {
    canvas: Element,
    design: DesignSize,
    object: Option<ObjectTransform>,
}

impl WebHost {
    /// Find the canvas matching `selector`.
    pub fn resolve(document: &Document, selector: &str, design: DesignSize) -> Result<Self, WebError> {
        let canvas = document
            .query_selector(selector)
            .map_err(|err| WebError::Js(describe(&err)))?
            .ok_or_else(|| WebError::CanvasMissing(selector.to_owned()))?;
        Ok(Self {
            canvas,
            design,
            object: None,
        })
    }

    /// Replace the tracked object; `None` until the host has one.
    pub fn set_object(&mut self, object: Option<ObjectTransform>) {
        self.object = object;
    }
}

impl HostView for WebHost {
    fn viewport(&self) -> Option<ViewportSnapshot> {
        if !self.canvas.is_connected() {
            return None;
        }
        let rect = self.canvas.get_bounding_client_rect();
        Some(ViewportSnapshot::new(
            self.design,
            ScreenRect::new(rect.left(), rect.top(), rect.width(), rect.height()),
        ))
    }

    fn object_transform(&self) -> Option<ObjectTransform> {
        self.object
    }
}
