//! Resolved console settings.

use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::secrets::AuthToken;
use crate::telemetry::LogFormat;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {field} '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{field} must be an http(s) URL, got '{value}'")]
    UnsupportedScheme { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub base_url: Url,
    pub auth: Option<AuthToken>,
    pub assistant_url: Url,
    pub log_format: LogFormat,
}

impl ConsoleConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_http_url("--url", &cli.url)?,
            auth: cli.auth.as_deref().and_then(AuthToken::new),
            assistant_url: parse_http_url("--assistant-url", &cli.assistant_url)?,
            log_format: cli.log_format,
        })
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            field,
            value: value.to_string(),
        });
    }
    Ok(url)
}
