//! Error types for the console.

use thiserror::Error;

/// Errors returned by [`crate::ConsoleClient`].
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy rejected the credentials (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The proxy rate limited the request (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Any other non-success response.
    #[error("request failed with {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body, if any.
        detail: Option<String>,
    },

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL could not be joined with an endpoint path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Why a log synchronization did not merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("authorization code invalid or missing")]
    Unauthorized,

    #[error("failed to fetch logs: {0}")]
    FetchFailed(String),
}

impl From<ConsoleError> for SyncError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Unauthorized => SyncError::Unauthorized,
            other => SyncError::FetchFailed(other.to_string()),
        }
    }
}

/// Name of the proxy setting holding the admin secret.
pub const AUTH_SECRET_NAME: &str = "LAOPOBAO_AUTH";

/// Why a key check produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyCheckError {
    #[error("authentication failed, check your {} key", AUTH_SECRET_NAME)]
    AuthenticationFailed,

    #[error("too many requests, try again later")]
    RateLimited,

    #[error("check failed: {0}")]
    CheckFailed(String),

    /// Another check still holds the trigger.
    #[error("a key check is already running")]
    InProgress,
}

impl From<ConsoleError> for KeyCheckError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Unauthorized => KeyCheckError::AuthenticationFailed,
            ConsoleError::RateLimited => KeyCheckError::RateLimited,
            ConsoleError::Status {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => KeyCheckError::CheckFailed(detail),
            ConsoleError::Status { status, .. } => {
                KeyCheckError::CheckFailed(status_text(status))
            }
            other => KeyCheckError::CheckFailed(other.to_string()),
        }
    }
}

/// Best-effort action failures (clipboard, browser). The watch session
/// shows them as a transient label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("could not open {url}: {reason}")]
    Open { url: String, reason: String },
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
