use std::fs;
use std::path::Path;

use actionprims::codec::value::DEFAULT_MIME_TYPE;
use actionprims::codec::{encode, encode_with_prefix, Attachment, FlatTransport, Value};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, json_error, CliError, CliResult, SUCCESS};
use crate::output::{print_transport, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let json: serde_json::Value =
        serde_json::from_str(&args.json).map_err(|err| json_error("--json", err))?;
    let value = Value::from(json);

    let mut transport = match &args.prefix {
        Some(prefix) => encode_with_prefix(&value, prefix),
        None => encode(&value),
    };
    attach_files(&mut transport, &args.files)?;

    tracing::debug!(fields = transport.len(), "encoded value");
    print_transport(&transport, format);
    Ok(SUCCESS)
}

fn attach_files(transport: &mut FlatTransport, specs: &[String]) -> CliResult<()> {
    for spec in specs {
        let (key, path) = parse_file_spec(spec)?;
        let attachment = read_attachment(Path::new(path))?;
        tracing::debug!(key, size = attachment.size(), "attaching file");
        transport.set(key, attachment);
    }
    Ok(())
}

fn parse_file_spec(spec: &str) -> CliResult<(&str, &str)> {
    spec.split_once('=')
        .filter(|(key, path)| !key.is_empty() && !path.is_empty())
        .ok_or_else(|| CliError::usage(format!("--file expects KEY=PATH, got '{spec}'")))
}

fn read_attachment(path: &Path) -> CliResult<Attachment> {
    let data = fs::read(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment::new(name, mime_type_for(path), data))
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => DEFAULT_MIME_TYPE,
    }
}
