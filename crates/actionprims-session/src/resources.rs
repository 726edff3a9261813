//! Resources a session owns exclusively: the in-flight cancellation token,
//! the cache-expiry timer and lifecycle subscriptions.
//!
//! Every replacement releases the predecessor, and [`SessionResources::release_all`]
//! releases everything. Dropping the record does the same.

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::lifecycle::Subscription;

/// Token of the request currently in flight. Dropping it cancels the token.
struct InFlight {
    generation: u64,
    guard: DropGuard,
}

/// Pending cache expiry. Dropping it aborts the timer task.
pub(crate) struct CacheTimer {
    id: u64,
    handle: Option<JoinHandle<()>>,
}

impl CacheTimer {
    pub(crate) fn new(id: u64, handle: JoinHandle<()>) -> Self {
        Self {
            id,
            handle: Some(handle),
        }
    }

    /// Release without aborting, for a timer that has already fired.
    fn disarm(mut self) {
        let _detached = self.handle.take();
    }
}

impl Drop for CacheTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[derive(Default)]
pub(crate) struct SessionResources {
    in_flight: Option<InFlight>,
    cache_timer: Option<CacheTimer>,
    subscriptions: Vec<Subscription>,
}

impl SessionResources {
    /// Cancel the in-flight request, if any, and hand out a token for a new one.
    pub(crate) fn begin_request(&mut self, generation: u64) -> CancellationToken {
        let token = CancellationToken::new();
        self.in_flight = Some(InFlight {
            generation,
            guard: token.clone().drop_guard(),
        });
        token
    }

    /// Stop tracking a request that completed normally, without cancelling it.
    pub(crate) fn finish_request(&mut self, generation: u64) {
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            if let Some(in_flight) = self.in_flight.take() {
                let _token = in_flight.guard.disarm();
            }
        }
    }

    /// Cancel the in-flight request, if any.
    pub(crate) fn cancel_request(&mut self) {
        self.in_flight = None;
    }

    #[cfg(test)]
    pub(crate) fn has_request(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Install a new cache timer, aborting the previous one.
    pub(crate) fn replace_cache_timer(&mut self, timer: CacheTimer) {
        self.cache_timer = Some(timer);
    }

    /// Abort the pending cache timer, if any.
    pub(crate) fn clear_cache_timer(&mut self) {
        self.cache_timer = None;
    }

    /// Forget the timer identified by `id` once it has fired.
    ///
    /// Returns false when a newer timer replaced it in the meantime.
    pub(crate) fn take_fired_timer(&mut self, id: u64) -> bool {
        match self.cache_timer.take() {
            Some(timer) if timer.id == id => {
                timer.disarm();
                true
            }
            other => {
                self.cache_timer = other;
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn has_cache_timer(&self) -> bool {
        self.cache_timer.is_some()
    }

    pub(crate) fn add_subscriptions(&mut self, subscriptions: Vec<Subscription>) {
        self.subscriptions.extend(subscriptions);
    }

    /// Cancel the request and abort the timer; hand back subscriptions so the
    /// caller can detach them outside any lock.
    pub(crate) fn release_all(&mut self) -> Vec<Subscription> {
        self.cancel_request();
        self.clear_cache_timer();
        std::mem::take(&mut self.subscriptions)
    }
}
