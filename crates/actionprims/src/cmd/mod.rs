use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod echo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Flatten a JSON value into transport fields.
    Encode(EncodeArgs),
    /// Rebuild a structured value from transport fields.
    Decode(DecodeArgs),
    /// Run a payload through a session around a local echo action.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Echo(args) => echo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON value to encode.
    #[arg(long)]
    pub json: String,
    /// Attach a file under a transport key (KEY=PATH). Repeatable.
    #[arg(long = "file", value_name = "KEY=PATH")]
    pub files: Vec<String>,
    /// Prefix prepended to every emitted key.
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Transport field (KEY=VALUE). Repeatable; order is preserved.
    #[arg(long = "field", value_name = "KEY=VALUE", conflicts_with = "json")]
    pub fields: Vec<String>,
    /// Flat JSON object of transport fields, processed in key order.
    #[arg(long)]
    pub json: Option<String>,
    /// Fail on shape conflicts instead of skipping the entry.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// JSON payload to send.
    #[arg(long, default_value = "{}")]
    pub json: String,
    /// Message reported by the echo action.
    #[arg(long)]
    pub message: Option<String>,
    /// Make the echo action fail with this error.
    #[arg(long, value_name = "ERROR")]
    pub fail: Option<String>,
    /// How long settled data is cached (e.g. 5s, 500ms).
    #[arg(long)]
    pub cache_time: Option<String>,
    /// Wait after settling before reading the session snapshot (e.g. 1s).
    #[arg(long)]
    pub linger: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
