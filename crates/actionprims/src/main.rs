mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "actionprims", version, about = "Action transport and session CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "ACTIONPRIMS_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::debug!(code = err.code, "command failed");
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_decode_fields() {
        let cli = Cli::try_parse_from([
            "actionprims",
            "decode",
            "--field",
            "user.name=Ada",
            "--field",
            "tags[0]=a",
            "--strict",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.fields, vec!["user.name=Ada", "tags[0]=a"]);
                assert!(args.strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_fields_with_json() {
        let err = Cli::try_parse_from([
            "actionprims",
            "decode",
            "--field",
            "a=1",
            "--json",
            "{\"a\":1}",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from([
            "actionprims",
            "encode",
            "--json",
            "{}",
            "--format",
            "pretty",
        ])
        .expect("encode args should parse");
        assert_eq!(cli.format, Some(OutputFormat::Pretty));
    }

    #[test]
    fn parses_echo_durations() {
        let cli = Cli::try_parse_from([
            "actionprims",
            "echo",
            "--json",
            "{\"x\":1}",
            "--cache-time",
            "5s",
        ])
        .expect("echo args should parse");
        assert!(matches!(
            cli.command,
            Command::Echo(ref args) if args.cache_time.as_deref() == Some("5s")
        ));
    }
}
