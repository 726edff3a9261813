use crate::infer::format_date;
use crate::transport::FlatTransport;
use crate::value::Value;

/// Flatten a structured value into a transport.
///
/// Key layout:
/// ```text
/// {user: {name: "John"}, tags: ["a", "b"], files: [{name: "x"}]}
///   user.name   = "John"
///   tags[0]     = "a"
///   tags[1]     = "b"
///   files[0].name = "x"
/// ```
pub fn encode(value: &Value) -> FlatTransport {
    encode_with_prefix(value, "")
}

/// Flatten a structured value under `prefix`.
///
/// A non-container value at the root is emitted under `prefix` itself.
pub fn encode_with_prefix(value: &Value, prefix: &str) -> FlatTransport {
    let mut transport = FlatTransport::new();
    encode_into(value, prefix, &mut transport);
    transport
}

fn encode_into(value: &Value, path: &str, out: &mut FlatTransport) {
    match value {
        Value::Null => out.append(path, ""),
        Value::Attachment(attachment) => out.append(path, attachment.clone()),
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                encode_into(item, &format!("{path}[{index}]"), out);
            }
        }
        Value::Map(map) => {
            for (key, item) in map {
                encode_into(item, &child_path(path, key), out);
            }
        }
        Value::Date(date) => out.append(path, format_date(date)),
        other => out.append(path, other.to_string()),
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::transport::FieldValue;
    use crate::value::Attachment;

    fn text_entries(transport: &FlatTransport) -> Vec<(String, String)> {
        transport
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_text().unwrap_or("<attachment>").to_string()))
            .collect()
    }

    #[test]
    fn encodes_nested_maps_and_lists() {
        let value = Value::map([
            (
                "user",
                Value::map([
                    ("name", Value::from("John")),
                    ("profile", Value::map([("age", Value::Number(30.0))])),
                ]),
            ),
            ("tags", Value::list([Value::from("react"), Value::from("ts")])),
        ]);

        let mut entries = text_entries(&encode(&value));
        entries.sort();
        let mut expected = vec![
            ("user.name".to_string(), "John".to_string()),
            ("user.profile.age".to_string(), "30".to_string()),
            ("tags[0]".to_string(), "react".to_string()),
            ("tags[1]".to_string(), "ts".to_string()),
        ];
        expected.sort();
        assert_eq!(entries, expected);
    }

    #[test]
    fn null_becomes_empty_text() {
        let value = Value::map([("missing", Value::Null)]);
        assert_eq!(
            text_entries(&encode(&value)),
            vec![("missing".to_string(), String::new())]
        );
    }

    #[test]
    fn attachments_are_not_stringified() {
        let file = Attachment::new("photo.png", "image/png", vec![0x89, 0x50]);
        let value = Value::map([(
            "files",
            Value::list([Value::map([("blob", Value::Attachment(file.clone()))])]),
        )]);

        let transport = encode(&value);
        assert_eq!(
            transport.get("files[0].blob"),
            Some(&FieldValue::Attachment(file))
        );
    }

    #[test]
    fn dates_become_iso_strings() {
        let date = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        let value = Value::map([("at", Value::Date(date))]);
        assert_eq!(
            text_entries(&encode(&value)),
            vec![("at".to_string(), "2023-12-01T10:30:00.000Z".to_string())]
        );
    }

    #[test]
    fn nested_lists_chain_brackets() {
        let value = Value::map([(
            "grid",
            Value::list([Value::list([Value::Bool(true), Value::Bool(false)])]),
        )]);
        assert_eq!(
            text_entries(&encode(&value)),
            vec![
                ("grid[0][0]".to_string(), "true".to_string()),
                ("grid[0][1]".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn empty_containers_emit_nothing() {
        let value = Value::map([("list", Value::list([])), ("map", Value::map::<&str, _>([]))]);
        assert!(encode(&value).is_empty());
    }

    #[test]
    fn prefix_applies_to_root() {
        let value = Value::map([("a", Value::from("1"))]);
        assert_eq!(
            text_entries(&encode_with_prefix(&value, "form")),
            vec![("form.a".to_string(), "1".to_string())]
        );
        assert_eq!(
            text_entries(&encode_with_prefix(&Value::from("x"), "solo")),
            vec![("solo".to_string(), "x".to_string())]
        );
    }
}
