use crate::error::{CodecError, Result};
use crate::value::Attachment;

/// A single transport value: text or a binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Attachment(Attachment),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Attachment(_) => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Attachment> {
        match self {
            FieldValue::Attachment(attachment) => Some(attachment),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Attachment> for FieldValue {
    fn from(value: Attachment) -> Self {
        FieldValue::Attachment(value)
    }
}

/// Flat, multi-valued, insertion-ordered key/value transport.
///
/// Keys are dotted/bracketed paths (`user.name`, `tags[0]`). Repeated keys
/// only arise from explicit [`append`](FlatTransport::append) calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTransport {
    entries: Vec<(String, FieldValue)>,
}

impl FlatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, keeping any existing values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Replace all values for `key` with a single entry.
    ///
    /// The new entry takes the position of the first existing one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((key, value)),
        }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove every value stored under `key`. Returns how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parse a `key=value` text field and append it.
    ///
    /// Only the first `=` separates; the value may contain more.
    pub fn append_field(&mut self, spec: &str) -> Result<()> {
        let (key, value) = spec
            .split_once('=')
            .ok_or_else(|| CodecError::InvalidField(spec.to_string()))?;
        if key.is_empty() {
            return Err(CodecError::InvalidField(spec.to_string()));
        }
        self.append(key, value);
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for FlatTransport
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transport = FlatTransport::new();
        for (key, value) in iter {
            transport.append(key, value);
        }
        transport
    }
}

impl IntoIterator for FlatTransport {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
