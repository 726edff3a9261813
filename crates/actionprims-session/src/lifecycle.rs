//! Host lifecycle signals as an injected subscription capability.
//!
//! A session never assumes a particular component runtime. It only needs
//! something that can `subscribe(event, listener)` and hand back a
//! [`Subscription`] whose drop detaches the listener.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Signals a host emits about the component that owns a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The owning component became active.
    Mounted,
    /// The owning component went away for good.
    Unmounted,
    /// The host regained focus or visibility.
    Focused,
}

/// Callback registered for a lifecycle event.
pub type Listener = Arc<dyn Fn(LifecycleEvent) + Send + Sync>;

/// Anything that can deliver lifecycle events.
pub trait LifecycleSource {
    /// Register `listener` for `event`. The listener stays registered until
    /// the returned subscription is dropped or unsubscribed.
    fn subscribe(&self, event: LifecycleEvent, listener: Listener) -> Subscription;
}

/// Handle that detaches a listener when released.
#[must_use = "dropping a subscription detaches its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a detach routine. It runs exactly once.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Detach now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// In-process lifecycle source. Hosts call [`emit`](LifecycleHub::emit).
#[derive(Clone, Default)]
pub struct LifecycleHub {
    inner: Arc<Mutex<HubInner>>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, LifecycleEvent, Listener)>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to its listeners. Returns how many were notified.
    ///
    /// Listeners run without the hub lock held, so they may subscribe or
    /// unsubscribe re-entrantly.
    pub fn emit(&self, event: LifecycleEvent) -> usize {
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner
                .listeners
                .iter()
                .filter(|(_, registered, _)| *registered == event)
                .map(|(_, _, listener)| Arc::clone(listener))
                .collect()
        };
        tracing::debug!(?event, listeners = listeners.len(), "emitting lifecycle event");
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Number of registered listeners across all events.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

impl LifecycleSource for LifecycleHub {
    fn subscribe(&self, event: LifecycleEvent, listener: Listener) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, event, listener));
            id
        };

        let hub: Weak<Mutex<HubInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .retain(|(registered, _, _)| *registered != id);
            }
        })
    }
}

impl fmt::Debug for LifecycleHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
