use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use actionprims_codec::Value;

use crate::payload::Payload;

/// Default window in which repeated triggers of a loading session are dropped.
pub const DEFAULT_DEDUPING_INTERVAL: Duration = Duration::from_secs(2);

/// Invoked with the payload of every committed success.
pub type SuccessCallback = Arc<dyn Fn(&Value) + Send + Sync>;
/// Invoked with the message of every committed failure.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Configuration for a [`Session`](crate::Session).
///
/// The action itself is passed to `Session::new`; everything here is optional.
#[derive(Clone)]
pub struct SessionConfig {
    /// Execution gate. `Some(false)` turns every execute into a no-op;
    /// `None` means no gate. Can be changed later with `set_condition`.
    pub condition: Option<bool>,
    /// How long a successful payload is held before being cleared.
    /// `Duration::ZERO` disables expiry.
    pub cache_time: Duration,
    /// Let the first activation execute run even while the condition gate
    /// is closed. Has no effect when `execute_on_mount` is off.
    pub revalidate_on_mount: bool,
    /// Refetch whenever the host regains focus or visibility.
    pub revalidate_on_focus: bool,
    /// Triggers arriving within this window of a still-loading request are
    /// dropped.
    pub deduping_interval: Duration,
    /// Execute with `initial_execute_data` on first activation.
    pub execute_on_mount: bool,
    /// Payload for the first automatic execute.
    pub initial_execute_data: Option<Payload>,
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SessionConfig {
    /// Set the success callback.
    pub fn with_on_success(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Set the error callback.
    pub fn with_on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// True when the first activation execute should skip the condition gate.
    pub fn activation_ignores_condition(&self) -> bool {
        self.execute_on_mount && self.revalidate_on_mount
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            condition: None,
            cache_time: Duration::ZERO,
            revalidate_on_mount: false,
            revalidate_on_focus: false,
            deduping_interval: DEFAULT_DEDUPING_INTERVAL,
            execute_on_mount: true,
            initial_execute_data: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("condition", &self.condition)
            .field("cache_time", &self.cache_time)
            .field("revalidate_on_mount", &self.revalidate_on_mount)
            .field("revalidate_on_focus", &self.revalidate_on_focus)
            .field("deduping_interval", &self.deduping_interval)
            .field("execute_on_mount", &self.execute_on_mount)
            .field("initial_execute_data", &self.initial_execute_data)
            .field("on_success", &self.on_success.as_ref().map(|_| "<callback>"))
            .field("on_error", &self.on_error.as_ref().map(|_| "<callback>"))
            .finish()
    }
}
