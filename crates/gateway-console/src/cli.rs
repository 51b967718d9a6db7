use clap::Parser;

use crate::diagnostic::DEFAULT_ASSISTANT_URL;
use crate::telemetry::LogFormat;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7860";

#[derive(Parser, Debug)]
#[command(version, about = "Monitor a Gemini key-rotation proxy: health, call logs and key checks")]
pub struct Cli {
    /// What to do. If omitted, starts the interactive watch session.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the proxy.
    #[arg(long, env = "GATEWAY_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub url: String,

    /// Admin secret, sent as a bearer token.
    #[arg(long, env = "GATEWAY_AUTH", hide_env_values = true, global = true)]
    pub auth: Option<String>,

    /// Page opened by the "ask AI" action.
    #[arg(long, env = "GATEWAY_ASSISTANT_URL", default_value = DEFAULT_ASSISTANT_URL, global = true)]
    pub assistant_url: String,

    /// Log output format (logs go to stderr).
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Poll the call log every five seconds and accept commands on stdin.
    Watch,
    /// Probe the proxy's health once.
    Status,
    /// Fetch the call log once and print it newest first.
    Logs(LogsArgs),
    /// Ask the proxy to validate every configured key.
    CheckKeys(CheckKeysArgs),
}

#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Also print the full diagnostic of every failed call.
    #[arg(long, default_value_t = false)]
    pub errors: bool,
}

#[derive(Parser, Debug)]
pub struct CheckKeysArgs {
    /// Copy the invalid keys (comma separated) to the clipboard.
    #[arg(long = "copy-invalid", default_value_t = false)]
    pub copy_invalid: bool,
}
