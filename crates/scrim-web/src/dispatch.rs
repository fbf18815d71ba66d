// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event queue between DOM callbacks and the coordinator.
//!
//! Viewport changes (resize, orientation, fullscreen) are handled before the
//! callback returns whenever the coordinator is free, after anything already
//! queued. Every other callback pushes onto the queue and a scheduled drain
//! delivers it in order: session and gesture handling may unregister the
//! very callback that fired. A callback fired while the coordinator is busy
//! (an engine emitting synchronously from `destroy`, say) is picked up by the
//! drain loop already running.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use scrim_core::{Event, HostView, LifecycleCoordinator, MediaPlatform, PageEvent};
use tracing::{debug, warn};

/// Receives drained events.
pub trait EventHandler {
    /// Process one event.
    fn handle_event(&mut self, event: Event);
}

impl<P: MediaPlatform, H: HostView> EventHandler for LifecycleCoordinator<P, H> {
    fn handle_event(&mut self, event: Event) {
        self.handle(event);
    }
}

/// Runs a drain later. The browser uses a microtask; tests run it inline.
pub type Scheduler = fn(Box<dyn FnOnce()>);

/// Queue a drain on the microtask queue.
pub fn microtask(task: Box<dyn FnOnce()>) {
    wasm_bindgen_futures::spawn_local(async move { task() });
}

/// Run a drain immediately.
pub fn inline(task: Box<dyn FnOnce()>) {
    task();
}

trait Deliver {
    fn deliver(&self, event: Event);
}

/// Cloneable handle that callbacks use to post events.
///
/// Holds the dispatcher weakly; posting after it is gone is a no-op.
#[derive(Clone)]
pub struct EventSink {
    target: Weak<dyn Deliver>,
}

impl EventSink {
    /// Post `event`.
    pub fn send(&self, event: Event) {
        match self.target.upgrade() {
            Some(target) => target.deliver(event),
            None => debug!(?event, "event after teardown dropped"),
        }
    }
}

/// Owns the event target and the pending queue.
pub struct Dispatcher<T> {
    me: Weak<Self>,
    queue: RefCell<VecDeque<Event>>,
    target: RefCell<Option<T>>,
    scheduled: Cell<bool>,
    schedule: Scheduler,
}

impl<T: EventHandler + 'static> Dispatcher<T> {
    /// Empty dispatcher draining through `schedule`.
    pub fn new(schedule: Scheduler) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            queue: RefCell::new(VecDeque::new()),
            target: RefCell::new(None),
            scheduled: Cell::new(false),
            schedule,
        })
    }

    /// Handle for callbacks.
    pub fn sink(&self) -> EventSink {
        let target: Weak<dyn Deliver> = self.me.clone();
        EventSink { target }
    }

    /// Install the target, returning the previous one.
    pub fn install(&self, target: T) -> Option<T> {
        let previous = self.target.borrow_mut().replace(target);
        self.drain();
        previous
    }

    /// Remove the target. Events still queued are discarded on the next drain.
    pub fn take(&self) -> Option<T> {
        self.target
            .try_borrow_mut()
            .ok()
            .and_then(|mut target| target.take())
    }

    /// Run `f` against the target, then deliver anything it queued.
    ///
    /// `None` when there is no target or it is already borrowed.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let out = match self.target.try_borrow_mut() {
            Ok(mut target) => target.as_mut().map(f),
            Err(_) => {
                warn!("dispatcher busy; call ignored");
                return None;
            }
        };
        self.drain();
        out
    }

    /// Number of events waiting.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Deliver queued events in order until the queue is empty.
    pub fn drain(&self) {
        self.scheduled.set(false);
        loop {
            let Ok(mut guard) = self.target.try_borrow_mut() else {
                return;
            };
            let Some(target) = guard.as_mut() else {
                self.queue.borrow_mut().clear();
                return;
            };
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                return;
            };
            target.handle_event(event);
        }
    }
}

impl<T: EventHandler + 'static> Deliver for Dispatcher<T> {
    fn deliver(&self, event: Event) {
        let viewport = matches!(&event, Event::Page(page) if PageEvent::VIEWPORT.contains(page));
        self.queue.borrow_mut().push_back(event);
        if viewport && self.target.try_borrow_mut().is_ok() {
            self.drain();
            return;
        }
        if !self.scheduled.replace(true) {
            let me = self.me.clone();
            (self.schedule)(Box::new(move || {
                if let Some(dispatcher) = me.upgrade() {
                    dispatcher.drain();
                }
            }));
        }
    }
}
