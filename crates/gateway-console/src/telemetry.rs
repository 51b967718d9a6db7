//! Structured logging setup.
//!
//! Logs go to stderr so stdout stays free for the console's own output.
//!
//! Environment variables:
//! - `RUST_LOG` - filter directive (default: "info")
//! - `LOG_FORMAT` - "json" or "pretty" (default: "pretty"), read by the CLI
//! - `TEST_LOG` - if set, tests print logs

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TelemetryConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `config.filter`.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_with_config(name: &str, config: TelemetryConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let result = match config.format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if result.is_ok() {
        tracing::debug!(app = name, format = ?config.format, "telemetry initialized");
    }
}

/// Test logging; silent unless `TEST_LOG` is set.
pub fn init_test() {
    if std::env::var_os("TEST_LOG").is_none() {
        return;
    }
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_test_writer())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides() {
        let config = TelemetryConfig::default()
            .with_filter("debug")
            .with_format(LogFormat::Json);
        assert_eq!(config.filter, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }
}
