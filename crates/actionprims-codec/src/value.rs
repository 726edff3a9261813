use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Map, Number};

use crate::infer::{format_date, format_number};

/// Fallback MIME type for attachments created without one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A binary attachment carried through the transport without stringification.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name reported to the receiving side.
    pub name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Raw content.
    pub data: Bytes,
}

impl Attachment {
    /// Create an attachment with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Create an attachment typed as `application/octet-stream`.
    pub fn octet_stream(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(name, DEFAULT_MIME_TYPE, data)
    }

    /// Content length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Serialization-safe description of the attachment.
    ///
    /// This is what crosses a serialization boundary in place of the bytes.
    pub fn metadata(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("size".to_string(), Value::Number(self.size() as f64));
        map.insert("type".to_string(), Value::String(self.mime_type.clone()));
        Value::Map(map)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &format_args!("{} bytes", self.size()))
            .finish()
    }
}

/// An arbitrarily nested structured value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Attachment(Attachment),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Replace dates with ISO-8601 strings and attachments with their
    /// metadata, recursively. The result has no non-JSON leaves.
    pub fn sanitize(self) -> Value {
        match self {
            Value::Date(date) => Value::String(format_date(&date)),
            Value::Attachment(attachment) => attachment.metadata(),
            Value::List(items) => Value::List(items.into_iter().map(Value::sanitize).collect()),
            Value::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, value.sanitize()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Render as JSON, sanitizing dates and attachments on the way.
    ///
    /// Non-finite numbers have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => json_number(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(date) => serde_json::Value::String(format_date(date)),
            Value::Attachment(attachment) => attachment.metadata().to_json(),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<Attachment> for Value {
    fn from(value: Attachment) -> Self {
        Value::Attachment(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    /// Text form used for transport leaves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(date) => f.write_str(&format_date(date)),
            Value::Attachment(attachment) => write!(f, "[attachment {}]", attachment.name),
            Value::List(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json_preserves_structure() {
        let value = Value::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        assert_eq!(
            value,
            Value::map([
                (
                    "a",
                    Value::list([Value::Number(1.0), Value::from("two"), Value::Null])
                ),
                ("b", Value::map([("c", Value::Bool(true))])),
            ])
        );
    }

    #[test]
    fn to_json_sanitizes_dates_and_attachments() {
        let date = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        let value = Value::map([
            ("when", Value::Date(date)),
            ("file", Value::Attachment(Attachment::new("a.png", "image/png", vec![1, 2, 3]))),
            ("count", Value::Number(3.0)),
            ("ratio", Value::Number(0.5)),
        ]);

        assert_eq!(
            value.to_json(),
            json!({
                "when": "2023-12-01T10:30:00.000Z",
                "file": {"name": "a.png", "size": 3, "type": "image/png"},
                "count": 3,
                "ratio": 0.5,
            })
        );
    }

    #[test]
    fn sanitize_recurses_into_lists() {
        let date = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let value = Value::list([Value::list([Value::Date(date)])]).sanitize();
        assert_eq!(
            value,
            Value::list([Value::list([Value::from("2020-01-02T03:04:05.000Z")])])
        );
    }

    #[test]
    fn attachment_debug_hides_bytes() {
        let attachment = Attachment::octet_stream("blob.bin", vec![0u8; 16]);
        let rendered = format!("{attachment:?}");
        assert!(rendered.contains("16 bytes"));
        assert!(rendered.contains("application/octet-stream"));
    }
}
