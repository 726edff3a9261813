use actionprims_codec::Value;
use serde_json::json;

use crate::outcome::RawOutcome;

/// Message attached to a success that did not provide one.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
/// Message attached to a failure that did not provide one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Operation failed";

/// Outcome of a wrapped action. Exactly one variant, always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Success { data: Value, message: String },
    Failure { error: Value, message: String },
}

impl ActionResult {
    /// Success with the default message.
    pub fn success(data: impl Into<Value>) -> Self {
        ActionResult::Success {
            data: data.into(),
            message: DEFAULT_SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Failure whose structured error is the message itself.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        ActionResult::Failure {
            error: Value::String(message.clone()),
            message,
        }
    }

    /// Classify a raw outcome.
    ///
    /// Precedence is fixed by the [`RawOutcome`] variant; only absent messages
    /// are filled in. Success data is sanitized for serialization.
    pub fn from_outcome(outcome: RawOutcome) -> Self {
        match outcome {
            RawOutcome::Tagged {
                ok: true,
                data,
                message,
                ..
            } => ActionResult::Success {
                data: data.unwrap_or_default().sanitize(),
                message: message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            },
            RawOutcome::Tagged {
                ok: false,
                error,
                message,
                ..
            } => {
                let error = error.unwrap_or_default();
                let message = failure_message(message, &error);
                ActionResult::Failure { error, message }
            }
            RawOutcome::Data { data, message } => ActionResult::Success {
                data: data.sanitize(),
                message: message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            },
            RawOutcome::Error { error, message } => {
                let message = failure_message(message, &error);
                ActionResult::Failure { error, message }
            }
            RawOutcome::Plain(value) => ActionResult::Success {
                data: value.sanitize(),
                message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ActionResult::Success { message, .. } | ActionResult::Failure { message, .. } => {
                message
            }
        }
    }

    /// Payload of a success.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ActionResult::Success { data, .. } => Some(data),
            ActionResult::Failure { .. } => None,
        }
    }

    /// Structured error of a failure.
    pub fn error(&self) -> Option<&Value> {
        match self {
            ActionResult::Failure { error, .. } => Some(error),
            ActionResult::Success { .. } => None,
        }
    }

    /// Render as `{ok, data, message}` or `{ok, error, message}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ActionResult::Success { data, message } => json!({
                "ok": true,
                "data": data.to_json(),
                "message": message,
            }),
            ActionResult::Failure { error, message } => json!({
                "ok": false,
                "error": error.to_json(),
                "message": message,
            }),
        }
    }
}

impl From<RawOutcome> for ActionResult {
    fn from(outcome: RawOutcome) -> Self {
        ActionResult::from_outcome(outcome)
    }
}

/// Explicit message, else a textual error, else the default.
fn failure_message(message: Option<String>, error: &Value) -> String {
    message
        .or_else(|| error.as_str().filter(|s| !s.is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}
