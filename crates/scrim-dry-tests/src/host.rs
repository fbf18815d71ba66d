// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host-view fake and viewport fixtures.

use std::sync::{Arc, Mutex, MutexGuard};

use scrim_core::{DesignSize, HostView, ObjectTransform, ScreenRect, ViewportSnapshot};

/// 960×640 design shown in a 1440×900 rectangle at the page origin.
pub fn landscape_viewport() -> ViewportSnapshot {
    ViewportSnapshot::new(
        DesignSize::new(960.0, 640.0),
        ScreenRect::new(0.0, 0.0, 1440.0, 900.0),
    )
}

/// 200×100 object at the design center.
pub fn centered_object() -> ObjectTransform {
    ObjectTransform::new(0.0, 0.0, 200.0, 100.0)
}

#[derive(Default)]
struct HostState {
    viewport: Option<ViewportSnapshot>,
    object: Option<ObjectTransform>,
    viewport_reads: usize,
}

/// Scriptable [`HostView`] that counts how often the viewport is resolved.
#[derive(Clone, Default)]
pub struct FakeHost {
    inner: Arc<Mutex<HostState>>,
}

impl FakeHost {
    /// Host with nothing resolvable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host showing [`landscape_viewport`] with [`centered_object`].
    pub fn landscape() -> Self {
        let host = Self::new();
        host.set_viewport(Some(landscape_viewport()));
        host.set_object(Some(centered_object()));
        host
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the viewport (`None` = unresolvable).
    pub fn set_viewport(&self, viewport: Option<ViewportSnapshot>) {
        self.lock().viewport = viewport;
    }

    /// Replace the tracked object (`None` = unresolvable).
    pub fn set_object(&self, object: Option<ObjectTransform>) {
        self.lock().object = object;
    }

    /// Number of `viewport()` calls so far (one per geometry recompute).
    pub fn viewport_reads(&self) -> usize {
        self.lock().viewport_reads
    }
}

impl HostView for FakeHost {
    fn viewport(&self) -> Option<ViewportSnapshot> {
        let mut state = self.lock();
        state.viewport_reads += 1;
        state.viewport
    }

    fn object_transform(&self) -> Option<ObjectTransform> {
        self.lock().object
    }
}
