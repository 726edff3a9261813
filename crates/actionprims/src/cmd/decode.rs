use actionprims::codec::{decode, try_decode, FlatTransport};

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, json_error, CliError, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let transport = match &args.json {
        Some(json) => transport_from_json(json)?,
        None => transport_from_fields(&args.fields)?,
    };

    let value = if args.strict {
        try_decode(&transport).map_err(|err| codec_error("decode failed", err))?
    } else {
        decode(&transport)
    };

    print_value(&value, format);
    Ok(SUCCESS)
}

fn transport_from_fields(fields: &[String]) -> CliResult<FlatTransport> {
    let mut transport = FlatTransport::new();
    for field in fields {
        transport
            .append_field(field)
            .map_err(|err| codec_error("invalid --field", err))?;
    }
    Ok(transport)
}

/// Scalars become field text the way a form would carry them: strings as-is,
/// numbers and booleans by their JSON spelling, null as empty text.
fn transport_from_json(json: &str) -> CliResult<FlatTransport> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).map_err(|err| json_error("--json", err))?;
    let serde_json::Value::Object(entries) = parsed else {
        return Err(CliError::usage("--json must be a JSON object of transport fields"));
    };

    let mut transport = FlatTransport::new();
    for (key, value) in entries {
        let text = match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(text) => text,
            scalar @ (serde_json::Value::Bool(_) | serde_json::Value::Number(_)) => {
                scalar.to_string()
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(CliError::usage(format!(
                    "--json field '{key}' must be a scalar"
                )));
            }
        };
        transport.append(key, text);
    }
    Ok(transport)
}
