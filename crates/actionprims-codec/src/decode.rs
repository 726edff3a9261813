use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{CodecError, Result};
use crate::infer::infer_value;
use crate::transport::{FieldValue, FlatTransport};
use crate::value::Value;

/// Highest list index a key may address. Larger indices are rejected rather
/// than padded.
pub const MAX_LIST_INDEX: usize = 65_535;

/// Rebuild a structured value from a transport.
///
/// Total over any input: entries that conflict with the shape built so far
/// are skipped and logged. The result is always a map.
pub fn decode(transport: &FlatTransport) -> Value {
    let mut root = Value::Map(BTreeMap::new());
    for (key, field) in transport.iter() {
        if let Err(err) = decode_entry(&mut root, key, field) {
            warn!(error = %err, "dropping conflicting transport entry");
        }
    }
    root
}

/// Rebuild a structured value, failing on the first shape conflict.
pub fn try_decode(transport: &FlatTransport) -> Result<Value> {
    let mut root = Value::Map(BTreeMap::new());
    for (key, field) in transport.iter() {
        decode_entry(&mut root, key, field)?;
    }
    Ok(root)
}

/// Split a transport key into path segments.
///
/// `files[2].name` becomes `["files", "2", "name"]`. Empty segments are
/// dropped, so `a..b` and `a[]` collapse.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn decode_entry(root: &mut Value, key: &str, field: &FieldValue) -> Result<()> {
    let segments = split_key(key);
    if segments.is_empty() {
        debug!(key, "skipping transport entry without path segments");
        return Ok(());
    }

    let leaf = match field {
        FieldValue::Text(text) => infer_value(text),
        FieldValue::Attachment(attachment) => Value::Attachment(attachment.clone()),
    };
    assign(root, key, &segments, leaf)
}

fn assign(root: &mut Value, key: &str, segments: &[&str], leaf: Value) -> Result<()> {
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let next = segments[depth + 1];
        current = child_container(current, key, segment, is_index(next), depth > 0)?;
    }

    let slot = slot_mut(current, key, last, !parents.is_empty())?;
    *slot = leaf;
    Ok(())
}

/// Walk into `segment`, creating a list (when the following segment is an
/// index) or a map if nothing usable is there yet.
fn child_container<'a>(
    container: &'a mut Value,
    key: &str,
    segment: &str,
    next_is_index: bool,
    nested: bool,
) -> Result<&'a mut Value> {
    let slot = slot_mut(container, key, segment, nested)?;
    if is_falsy(slot) {
        *slot = if next_is_index {
            Value::List(Vec::new())
        } else {
            Value::Map(BTreeMap::new())
        };
    }
    if matches!(slot, Value::Map(_) | Value::List(_)) {
        Ok(slot)
    } else {
        Err(conflict(key, segment))
    }
}

/// Locate (creating as Null when absent) the slot `segment` addresses.
fn slot_mut<'a>(
    container: &'a mut Value,
    key: &str,
    segment: &str,
    nested: bool,
) -> Result<&'a mut Value> {
    match container {
        Value::Map(map) => {
            if nested && is_index(segment) {
                warn!(key, segment, "numeric segment addresses an existing map; stored as a map key");
            }
            Ok(map.entry(segment.to_string()).or_insert(Value::Null))
        }
        Value::List(items) => {
            let index = parse_index(segment).ok_or_else(|| {
                warn!(key, segment, "named segment addresses an existing list");
                conflict(key, segment)
            })?;
            if index > MAX_LIST_INDEX {
                return Err(conflict(key, segment));
            }
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        _ => Err(conflict(key, segment)),
    }
}

/// Values a newly addressed container may overwrite.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => *n == 0.0 || n.is_nan(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A canonical non-negative integer (`0`, `7`, `42`; not `07` or `+1`).
fn is_index(segment: &str) -> bool {
    parse_index(segment).is_some()
}

fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if !canonical {
        return None;
    }
    segment.parse().ok()
}

fn conflict(key: &str, segment: &str) -> CodecError {
    CodecError::ShapeConflict {
        key: key.to_string(),
        segment: segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::encode::encode;
    use crate::value::Attachment;

    fn transport(pairs: &[(&str, &str)]) -> FlatTransport {
        pairs.iter().copied().collect()
    }

    #[test]
    fn decodes_nested_map_with_inference() {
        let value = decode(&transport(&[("user.name", "John"), ("user.age", "30")]));
        assert_eq!(
            value,
            Value::map([(
                "user",
                Value::map([("name", Value::from("John")), ("age", Value::Number(30.0))])
            )])
        );
    }

    #[test]
    fn decodes_lists_and_objects_in_lists() {
        let value = decode(&transport(&[
            ("tags[0]", "react"),
            ("tags[1]", "ts"),
            ("files[0].name", "a.txt"),
            ("files[1].name", "b.txt"),
        ]));
        assert_eq!(
            value.get("tags"),
            Some(&Value::list([Value::from("react"), Value::from("ts")]))
        );
        assert_eq!(
            value.get("files"),
            Some(&Value::list([
                Value::map([("name", Value::from("a.txt"))]),
                Value::map([("name", Value::from("b.txt"))]),
            ]))
        );
    }

    #[test]
    fn decodes_date_time_leaf() {
        let value = decode(&transport(&[("at", "2023-12-01T10:30:00.000Z")]));
        let expected = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        assert_eq!(value.get("at"), Some(&Value::Date(expected)));
    }

    #[test]
    fn sparse_indices_pad_with_null() {
        let value = decode(&transport(&[("list[2]", "x")]));
        assert_eq!(
            value.get("list"),
            Some(&Value::list([Value::Null, Value::Null, Value::from("x")]))
        );
    }

    #[test]
    fn attachments_bypass_inference() {
        let mut flat = FlatTransport::new();
        let file = Attachment::new("123", "text/plain", b"true".to_vec());
        flat.append("doc.file", file.clone());

        let value = decode(&flat);
        assert_eq!(
            value.get("doc").and_then(|doc| doc.get("file")),
            Some(&Value::Attachment(file))
        );
    }

    #[test]
    fn later_duplicates_overwrite() {
        let value = decode(&transport(&[("a", "1"), ("a", "2")]));
        assert_eq!(value.get("a"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn first_segment_decides_container_type() {
        let list_first = decode(&transport(&[("list[0]", "a"), ("list.foo", "b")]));
        assert_eq!(list_first.get("list"), Some(&Value::list([Value::from("a")])));

        let map_first = decode(&transport(&[("list.foo", "b"), ("list[0]", "a")]));
        assert_eq!(
            map_first.get("list"),
            Some(&Value::map([("foo", Value::from("b")), ("0", Value::from("a"))]))
        );
    }

    #[test]
    fn try_decode_rejects_shape_conflicts() {
        let err = try_decode(&transport(&[("list[0]", "a"), ("list.foo", "b")])).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ShapeConflict { ref key, ref segment } if key == "list.foo" && segment == "foo"
        ));

        let err = try_decode(&transport(&[("name", "x"), ("name.first", "y")])).unwrap_err();
        assert!(matches!(err, CodecError::ShapeConflict { .. }));
    }

    #[test]
    fn falsy_leaf_is_replaced_by_container() {
        let value = decode(&transport(&[("user", ""), ("user.name", "x")]));
        assert_eq!(value.get("user"), Some(&Value::map([("name", Value::from("x"))])));
    }

    #[test]
    fn oversized_index_is_rejected() {
        let key = format!("list[{}]", MAX_LIST_INDEX + 1);
        assert!(try_decode(&transport(&[(key.as_str(), "x")])).is_err());
        assert_eq!(
            decode(&transport(&[(key.as_str(), "x")])).get("list"),
            Some(&Value::list([]))
        );
    }

    #[test]
    fn non_canonical_numbers_are_map_keys() {
        let value = decode(&transport(&[("codes.07", "x")]));
        assert_eq!(value.get("codes"), Some(&Value::map([("07", Value::from("x"))])));
    }

    #[test]
    fn split_key_handles_brackets_and_dots() {
        assert_eq!(split_key("files[2].name"), vec!["files", "2", "name"]);
        assert_eq!(split_key("grid[0][1]"), vec!["grid", "0", "1"]);
        assert_eq!(split_key("a..b[]"), vec!["a", "b"]);
        assert!(split_key("").is_empty());
    }

    #[test]
    fn roundtrip_is_exact_for_non_ambiguous_values() {
        let original = Value::map([
            (
                "user",
                Value::map([
                    ("name", Value::from("John")),
                    ("active", Value::Bool(true)),
                    ("score", Value::Number(9.5)),
                    ("nickname", Value::Null),
                ]),
            ),
            (
                "teams",
                Value::list([
                    Value::map([("id", Value::Number(1.0)), ("lead", Value::from("Ann"))]),
                    Value::map([("id", Value::Number(2.0)), ("lead", Value::from("Bo"))]),
                ]),
            ),
        ]);
        assert_eq!(decode(&encode(&original)), original);
    }

    #[test]
    fn roundtrip_reinterprets_ambiguous_strings() {
        let original = Value::map([
            ("zip", Value::from("02134")),
            ("flag", Value::from("false")),
            ("stamp", Value::from("2024-01-01T00:00:00Z")),
        ]);
        let decoded = decode(&encode(&original));
        assert_eq!(decoded.get("zip"), Some(&Value::Number(2134.0)));
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(false)));
        assert!(matches!(decoded.get("stamp"), Some(Value::Date(_))));
    }
}
