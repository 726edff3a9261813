use std::convert::Infallible;
use std::time::Duration;

use actionprims::codec::Value;
use actionprims::result::{wrap_action, ActionResult, RawAction, RawOutcome};
use actionprims::session::{Outcome, Payload, Session, SessionConfig, Snapshot};
use serde::Serialize;

use crate::cmd::EchoArgs;
use crate::exit::{io_error, json_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

struct EchoReport {
    result: ActionResult,
    snapshot: Snapshot,
}

#[derive(Serialize)]
struct EchoOutput {
    result: serde_json::Value,
    snapshot: SnapshotOutput,
}

#[derive(Serialize)]
struct SnapshotOutput {
    data: Option<serde_json::Value>,
    error: Option<String>,
    loading: bool,
}

pub fn run(args: EchoArgs, format: OutputFormat) -> CliResult<i32> {
    let json: serde_json::Value =
        serde_json::from_str(&args.json).map_err(|err| json_error("--json", err))?;
    let cache_time = args
        .cache_time
        .as_deref()
        .map(parse_duration)
        .transpose()?
        .unwrap_or(Duration::ZERO);
    let linger = args.linger.as_deref().map(parse_duration).transpose()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))?;
    let action = echo_action(args.message, args.fail);
    let report = runtime.block_on(exchange(action, Value::from(json), cache_time, linger))?;

    print_report(&report, format);
    Ok(if report.result.is_success() {
        SUCCESS
    } else {
        FAILURE
    })
}

/// Raw action answering with its own input, or with `fail` as the error.
fn echo_action(message: Option<String>, fail: Option<String>) -> impl RawAction {
    move |input: Value| {
        let message = message.clone();
        let fail = fail.clone();
        async move {
            let outcome = match fail {
                Some(error) => RawOutcome::Error {
                    error: Value::from(error),
                    message,
                },
                None => RawOutcome::Data {
                    data: input,
                    message,
                },
            };
            Ok::<_, Infallible>(outcome)
        }
    }
}

async fn exchange<R: RawAction>(
    action: R,
    payload: Value,
    cache_time: Duration,
    linger: Option<Duration>,
) -> CliResult<EchoReport> {
    let session = Session::new(
        wrap_action(action),
        SessionConfig {
            cache_time,
            ..SessionConfig::default()
        },
    );

    let result = match session.execute(Some(Payload::from(payload))).await {
        Outcome::Settled(result) => result,
        other => {
            return Err(CliError::new(
                INTERNAL,
                format!("echo request did not settle: {other:?}"),
            ))
        }
    };

    if let Some(linger) = linger {
        tracing::debug!(?linger, "lingering before snapshot");
        tokio::time::sleep(linger).await;
    }
    let snapshot = session.snapshot();
    session.teardown();

    Ok(EchoReport { result, snapshot })
}

fn print_report(report: &EchoReport, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let output = EchoOutput {
                result: report.result.to_json(),
                snapshot: SnapshotOutput {
                    data: report.snapshot.data.as_ref().map(Value::to_json),
                    error: report.snapshot.error.clone(),
                    loading: report.snapshot.loading,
                },
            };
            print_json(&output, format);
        }
        OutputFormat::Table => {
            let payload = match &report.result {
                ActionResult::Success { data, .. } => ("data", data),
                ActionResult::Failure { error, .. } => ("error", error),
            };
            let rows = vec![
                vec!["ok".to_string(), report.result.is_success().to_string()],
                vec!["message".to_string(), report.result.message().to_string()],
                vec![payload.0.to_string(), payload.1.to_json().to_string()],
                vec![
                    "snapshot.data".to_string(),
                    report
                        .snapshot
                        .data
                        .as_ref()
                        .map(|data| data.to_json().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ],
                vec![
                    "snapshot.error".to_string(),
                    report.snapshot.error.clone().unwrap_or_else(|| "-".to_string()),
                ],
            ];
            print_table(vec!["FIELD", "VALUE"], rows);
        }
    }
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration(" ").is_err());
    }

    #[test]
    fn echo_returns_payload_as_data() {
        let payload = Value::from(serde_json::json!({"user": {"name": "Ada", "age": 36}}));
        let report = runtime()
            .block_on(exchange(
                echo_action(Some("saved".to_string()), None),
                payload,
                Duration::ZERO,
                None,
            ))
            .unwrap();

        assert!(report.result.is_success());
        assert_eq!(report.result.message(), "saved");
        assert_eq!(
            report.snapshot.data.map(|data| data.to_json()),
            Some(serde_json::json!({"user": {"name": "Ada", "age": 36}}))
        );
    }

    #[test]
    fn failing_echo_reports_error() {
        let report = runtime()
            .block_on(exchange(
                echo_action(None, Some("rejected".to_string())),
                Value::Map(Default::default()),
                Duration::ZERO,
                None,
            ))
            .unwrap();

        assert!(!report.result.is_success());
        assert_eq!(report.result.message(), "rejected");
        assert_eq!(report.snapshot.error.as_deref(), Some("rejected"));
    }

    #[test]
    fn cached_data_expires_while_lingering() {
        let report = runtime()
            .block_on(exchange(
                echo_action(None, None),
                Value::from(serde_json::json!({"n": 1})),
                Duration::from_millis(10),
                Some(Duration::from_millis(50)),
            ))
            .unwrap();

        assert!(report.result.is_success());
        assert_eq!(report.snapshot.data, None);
    }
}
