use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actionprims_codec::Value;
use actionprims_result::{Action, ActionResult};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::lifecycle::{LifecycleEvent, LifecycleSource, Listener, Subscription};
use crate::payload::Payload;
use crate::resources::{CacheTimer, SessionResources};

/// What a call to [`Session::execute`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The condition gate is closed; nothing happened.
    Gated,
    /// A request started within the deduping interval is still loading.
    Deduplicated,
    /// A newer request, a reset or a teardown invalidated this request while
    /// it was in flight. Its result was discarded.
    Superseded,
    /// The session had already been torn down.
    TornDown,
    /// The result was committed to session state.
    Settled(ActionResult),
}

impl Outcome {
    /// The committed result, if any.
    pub fn result(&self) -> Option<&ActionResult> {
        match self {
            Outcome::Settled(result) => Some(result),
            _ => None,
        }
    }
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub data: Option<Value>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Request orchestration for one call site.
///
/// Cloning yields another handle to the same session. Resources are released
/// by [`teardown`](Session::teardown) or when the last handle is dropped.
pub struct Session<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for Session<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<A> {
    action: A,
    config: SessionConfig,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<Snapshot>,
}

#[derive(Default)]
struct SessionState {
    data: Option<Value>,
    error: Option<String>,
    loading: bool,
    condition: Option<bool>,
    last_payload: Option<Payload>,
    last_trigger: Option<Instant>,
    /// Bumped by every new request, reset and teardown. A request whose
    /// generation no longer matches is superseded.
    generation: u64,
    timer_seq: u64,
    /// Bumped by every write to `data`.
    data_epoch: u64,
    activated: bool,
    torn_down: bool,
    resources: SessionResources,
}

impl SessionState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            data: self.data.clone(),
            error: self.error.clone(),
            loading: self.loading,
        }
    }
}

impl<A> Shared<A> {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn expire_cache(&self, timer_id: u64) {
        let mut state = self.state();
        if !state.resources.take_fired_timer(timer_id) {
            return;
        }
        debug!(timer_id, "cache time elapsed; clearing data");
        state.data = None;
        state.data_epoch += 1;
        self.publish(&state);
    }
}

/// Cleans up after an execute future dropped before its request settled.
struct PendingRequest<'a, A> {
    shared: &'a Shared<A>,
    generation: u64,
    armed: bool,
}

impl<A> PendingRequest<'_, A> {
    fn settle(mut self) {
        self.armed = false;
    }
}

impl<A> Drop for PendingRequest<'_, A> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.shared.state();
        if state.generation != self.generation {
            return;
        }
        debug!(generation = self.generation, "execute abandoned; cancelling request");
        state.resources.cancel_request();
        state.loading = false;
        self.shared.publish(&state);
    }
}

impl<A: Action> Session<A> {
    /// Create a session around `action`.
    pub fn new(action: A, config: SessionConfig) -> Self {
        let state = SessionState {
            condition: config.condition,
            ..SessionState::default()
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                action,
                config,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.state().snapshot()
    }

    /// Receive a fresh [`Snapshot`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn data(&self) -> Option<Value> {
        self.shared.state().data.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.shared.state().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state().loading
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.state().torn_down
    }

    /// Open (`Some(true)`), close (`Some(false)`) or remove (`None`) the gate.
    pub fn set_condition(&self, condition: Option<bool>) {
        self.shared.state().condition = condition;
    }

    /// Run the action with `payload`, or with the last payload when `None`.
    ///
    /// Starting a request cancels and supersedes the one in flight. Only a
    /// request that is still current when its result arrives commits it.
    pub async fn execute(&self, payload: Option<Payload>) -> Outcome {
        self.run_request(payload, false).await
    }

    async fn run_request(&self, payload: Option<Payload>, ignore_condition: bool) -> Outcome {
        let (generation, token, transport) = {
            let mut state = self.shared.state();
            if state.torn_down {
                return Outcome::TornDown;
            }
            if !ignore_condition && state.condition == Some(false) {
                trace!("condition gate closed; skipping execute");
                return Outcome::Gated;
            }
            if let Some(payload) = payload {
                state.last_payload = Some(payload);
            }

            let now = Instant::now();
            let interval = self.shared.config.deduping_interval;
            if state.loading
                && state
                    .last_trigger
                    .is_some_and(|last| now.saturating_duration_since(last) < interval)
            {
                debug!("request already loading; deduplicated");
                return Outcome::Deduplicated;
            }
            state.last_trigger = Some(now);

            state.generation += 1;
            let generation = state.generation;
            let token = state.resources.begin_request(generation);
            state.loading = true;
            state.error = None;
            let transport = state
                .last_payload
                .as_ref()
                .map(Payload::to_transport)
                .unwrap_or_default();
            self.shared.publish(&state);
            (generation, token, transport)
        };

        debug!(generation, fields = transport.len(), "executing action");
        let pending = PendingRequest {
            shared: &self.shared,
            generation,
            armed: true,
        };
        let result = self.shared.action.call(transport, token).await;
        pending.settle();

        let committed_epoch = {
            let mut state = self.shared.state();
            if state.torn_down || state.generation != generation {
                debug!(generation, "discarding superseded result");
                return Outcome::Superseded;
            }
            state.resources.finish_request(generation);
            state.loading = false;
            match &result {
                ActionResult::Success { data, .. } => {
                    state.data = Some(data.clone());
                    state.data_epoch += 1;
                    state.resources.clear_cache_timer();
                }
                ActionResult::Failure { message, .. } => {
                    state.error = Some(message.clone());
                }
            }
            self.shared.publish(&state);
            state.data_epoch
        };

        // Order on success: commit, notify, then start the expiry clock.
        match &result {
            ActionResult::Success { data, .. } => {
                if let Some(on_success) = &self.shared.config.on_success {
                    on_success(data);
                }
                let mut state = self.shared.state();
                if !state.torn_down
                    && state.generation == generation
                    && state.data_epoch == committed_epoch
                {
                    self.arm_cache_timer(&mut state);
                }
            }
            ActionResult::Failure { message, .. } => {
                debug!(generation, message = %message, "action failed");
                if let Some(on_error) = &self.shared.config.on_error {
                    on_error(message);
                }
            }
        }
        Outcome::Settled(result)
    }

    /// Re-run the action with the last payload.
    pub async fn refetch(&self) -> Outcome {
        self.execute(None).await
    }

    /// Replace the held data without calling the action.
    ///
    /// Any pending cache expiry is cancelled.
    pub fn mutate(&self, value: Value) {
        let mut state = self.shared.state();
        state.data = Some(value);
        state.data_epoch += 1;
        state.resources.clear_cache_timer();
        self.shared.publish(&state);
    }

    /// Apply a speculative update to the held data.
    ///
    /// `update` runs while the session state is locked, so a result committed
    /// concurrently is never overwritten by a stale computation. It must not
    /// call back into the session.
    ///
    /// There is no automatic rollback; callers that need one keep the previous
    /// value and [`mutate`](Session::mutate) back.
    pub fn optimistic_mutate<F>(&self, update: F)
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let mut state = self.shared.state();
        let next = update(state.data.as_ref());
        state.data = Some(next);
        state.data_epoch += 1;
        self.shared.publish(&state);
    }

    /// Return to idle: clear data, error and the remembered payload, cancel
    /// the in-flight request and the cache timer.
    pub fn reset(&self) {
        let mut state = self.shared.state();
        state.data = None;
        state.data_epoch += 1;
        state.error = None;
        state.last_payload = None;
        state.last_trigger = None;
        state.loading = false;
        state.generation += 1;
        state.resources.cancel_request();
        state.resources.clear_cache_timer();
        self.shared.publish(&state);
    }

    /// Release every resource the session holds. Later executes are no-ops.
    pub fn teardown(&self) {
        let subscriptions = {
            let mut state = self.shared.state();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.loading = false;
            state.generation += 1;
            let subscriptions = state.resources.release_all();
            self.shared.publish(&state);
            subscriptions
        };
        debug!(subscriptions = subscriptions.len(), "session torn down");
        drop(subscriptions);
    }

    /// First activation. Executes with the initial payload when
    /// `execute_on_mount` is set; with `revalidate_on_mount` that execute
    /// ignores the condition gate. Later calls do nothing and return `None`.
    pub async fn activate(&self) -> Option<Outcome> {
        let payload = {
            let mut state = self.shared.state();
            if state.activated || state.torn_down {
                return None;
            }
            state.activated = true;
            if !self.shared.config.execute_on_mount {
                trace!("activated without initial execute");
                return None;
            }
            self.shared.config.initial_execute_data.clone()
        };
        let ignore_condition = self.shared.config.activation_ignores_condition();
        Some(self.run_request(payload, ignore_condition).await)
    }

    /// React to a host's lifecycle signals.
    ///
    /// `Mounted` activates, `Focused` refetches when `revalidate_on_focus` is
    /// set, `Unmounted` tears down. Subscriptions are released on teardown.
    pub fn attach<S>(&self, source: &S) -> Result<()>
    where
        S: LifecycleSource + ?Sized,
    {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let mut events = vec![LifecycleEvent::Mounted, LifecycleEvent::Unmounted];
        if self.shared.config.revalidate_on_focus {
            events.push(LifecycleEvent::Focused);
        }
        let subscriptions: Vec<Subscription> = events
            .into_iter()
            .map(|event| source.subscribe(event, self.listener(runtime.clone())))
            .collect();

        let mut state = self.shared.state();
        if state.torn_down {
            drop(state);
            drop(subscriptions);
            return Err(SessionError::TornDown);
        }
        state.resources.add_subscriptions(subscriptions);
        Ok(())
    }

    fn listener(&self, runtime: Handle) -> Listener {
        let shared = Arc::downgrade(&self.shared);
        Arc::new(move |event| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let session = Session { shared };
            match event {
                LifecycleEvent::Mounted => {
                    runtime.spawn(async move {
                        session.activate().await;
                    });
                }
                LifecycleEvent::Focused => {
                    runtime.spawn(async move {
                        session.refetch().await;
                    });
                }
                LifecycleEvent::Unmounted => session.teardown(),
            }
        })
    }

    #[cfg(test)]
    fn has_cache_timer(&self) -> bool {
        self.shared.state().resources.has_cache_timer()
    }

    fn arm_cache_timer(&self, state: &mut SessionState) {
        let cache_time = self.shared.config.cache_time;
        if cache_time.is_zero() {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no tokio runtime; cached data will not expire");
            return;
        };

        state.timer_seq += 1;
        let timer_id = state.timer_seq;
        let shared = Arc::downgrade(&self.shared);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(cache_time).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire_cache(timer_id);
            }
        });
        state
            .resources
            .replace_cache_timer(CacheTimer::new(timer_id, handle));
    }
}
