use std::io::IsTerminal;

use actionprims::codec::{encode, FieldValue, FlatTransport, Value};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FieldOutput<'a> {
    key: &'a str,
    kind: &'static str,
    value: serde_json::Value,
}

pub fn print_transport(transport: &FlatTransport, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let fields: Vec<FieldOutput<'_>> = transport
                .iter()
                .map(|(key, field)| FieldOutput {
                    key,
                    kind: field_kind(field),
                    value: field_json(field),
                })
                .collect();
            print_json(&fields, format);
        }
        OutputFormat::Table => {
            let rows = transport.iter().map(|(key, field)| {
                vec![
                    key.to_string(),
                    field_kind(field).to_string(),
                    field_preview(field),
                ]
            });
            print_table(vec!["KEY", "KIND", "VALUE"], rows);
        }
    }
}

/// Print a structured value. The table view lists its flattened leaves.
pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Pretty => print_json(&value.to_json(), format),
        OutputFormat::Table => {
            let flat = encode(value);
            let rows = flat
                .iter()
                .map(|(key, field)| vec![key.to_string(), field_preview(field)]);
            print_table(vec!["PATH", "VALUE"], rows);
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    let rendered = if format == OutputFormat::Pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", rendered.unwrap_or_else(|_| "null".to_string()));
}

pub fn print_table<I>(header: Vec<&str>, rows: I)
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

fn field_kind(field: &FieldValue) -> &'static str {
    match field {
        FieldValue::Text(_) => "text",
        FieldValue::Attachment(_) => "attachment",
    }
}

fn field_json(field: &FieldValue) -> serde_json::Value {
    match field {
        FieldValue::Text(text) => serde_json::Value::String(text.clone()),
        FieldValue::Attachment(attachment) => attachment.metadata().to_json(),
    }
}

pub fn field_preview(field: &FieldValue) -> String {
    match field {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Attachment(attachment) => format!(
            "<{} {} bytes {}>",
            attachment.name, attachment.size(), attachment.mime_type
        ),
    }
}
