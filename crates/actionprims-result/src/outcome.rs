use std::collections::BTreeMap;

use actionprims_codec::Value;

/// What a raw action handed back, before normalization.
///
/// Raw actions may build a variant directly, or return an arbitrary value
/// and let [`RawOutcome::classify`] pick the variant from its fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    /// Explicitly tagged result with a boolean discriminant.
    Tagged {
        ok: bool,
        data: Option<Value>,
        error: Option<Value>,
        message: Option<String>,
    },
    /// A value exposing `data` and no `error`.
    Data { data: Value, message: Option<String> },
    /// A value exposing `error` and no `data`.
    Error { error: Value, message: Option<String> },
    /// Anything else; treated as successful data.
    Plain(Value),
}

impl RawOutcome {
    /// Pick a variant from the fields of `value`.
    ///
    /// Precedence, first match wins:
    /// 1. a map with a boolean `ok` field is [`Tagged`](RawOutcome::Tagged)
    /// 2. a map with `data` but no `error` is [`Data`](RawOutcome::Data)
    /// 3. a map with `error` but no `data` is [`Error`](RawOutcome::Error)
    /// 4. everything else is [`Plain`](RawOutcome::Plain)
    pub fn classify(value: Value) -> Self {
        let mut map = match value {
            Value::Map(map) => map,
            other => return RawOutcome::Plain(other),
        };

        if let Some(ok) = map.get("ok").and_then(Value::as_bool) {
            return RawOutcome::Tagged {
                ok,
                data: map.remove("data"),
                error: map.remove("error"),
                message: take_message(&mut map),
            };
        }

        match (map.contains_key("data"), map.contains_key("error")) {
            (true, false) => RawOutcome::Data {
                data: map.remove("data").unwrap_or_default(),
                message: take_message(&mut map),
            },
            (false, true) => RawOutcome::Error {
                error: map.remove("error").unwrap_or_default(),
                message: take_message(&mut map),
            },
            _ => RawOutcome::Plain(Value::Map(map)),
        }
    }
}

/// Only textual messages count; anything else stays absent.
fn take_message(map: &mut BTreeMap<String, Value>) -> Option<String> {
    match map.remove("message") {
        Some(Value::String(message)) => Some(message),
        _ => None,
    }
}

impl From<Value> for RawOutcome {
    fn from(value: Value) -> Self {
        RawOutcome::classify(value)
    }
}

impl From<serde_json::Value> for RawOutcome {
    fn from(value: serde_json::Value) -> Self {
        RawOutcome::classify(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn boolean_ok_wins_over_field_shape() {
        let outcome = RawOutcome::from(json!({"ok": false, "data": 1, "error": "x", "message": "nope"}));
        assert_eq!(
            outcome,
            RawOutcome::Tagged {
                ok: false,
                data: Some(Value::Number(1.0)),
                error: Some(Value::from("x")),
                message: Some("nope".to_string()),
            }
        );
    }

    #[test]
    fn non_boolean_ok_is_not_a_tag() {
        let outcome = RawOutcome::from(json!({"ok": "yes", "data": [1]}));
        assert!(matches!(outcome, RawOutcome::Data { .. }));
    }

    #[test]
    fn data_without_error() {
        let outcome = RawOutcome::from(json!({"data": {"id": 7}}));
        assert_eq!(
            outcome,
            RawOutcome::Data {
                data: Value::map([("id", Value::Number(7.0))]),
                message: None,
            }
        );
    }

    #[test]
    fn error_without_data() {
        let outcome = RawOutcome::from(json!({"error": "denied", "message": "Access denied"}));
        assert_eq!(
            outcome,
            RawOutcome::Error {
                error: Value::from("denied"),
                message: Some("Access denied".to_string()),
            }
        );
    }

    #[test]
    fn both_fields_or_neither_is_plain() {
        assert!(matches!(
            RawOutcome::from(json!({"data": 1, "error": 2})),
            RawOutcome::Plain(_)
        ));
        assert!(matches!(
            RawOutcome::from(json!({"name": "x"})),
            RawOutcome::Plain(_)
        ));
        assert_eq!(
            RawOutcome::from(json!("text")),
            RawOutcome::Plain(Value::from("text"))
        );
    }
}
