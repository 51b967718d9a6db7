//! Wire types for the proxy's admin API.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------- Status ----------

/// Response from `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    pub key_count: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

// ---------- Logs ----------

/// Outcome recorded by the proxy for one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Failed,
    /// The proxy records in-flight attempts as `pending`.
    Pending,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Failed => "failed",
            LogStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `GET /api/logs` feed.
///
/// Entries are immutable once the proxy publishes them; `id` is the only
/// field the console uses to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogEntry {
    pub id: String,
    /// Server-formatted display string, never reparsed.
    pub timestamp: String,
    pub model: String,
    pub status: LogStatus,
    #[serde(default)]
    pub key_used: Option<String>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub error_info: Option<String>,
}

// ---------- Key check ----------

/// Response from `POST /api/check-keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyCheckResult {
    #[serde(default)]
    pub valid_keys: Vec<String>,
    #[serde(default)]
    pub invalid_keys: Vec<String>,
}

/// Error payload the proxy attaches to non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// The `detail` field as display text. Validation errors carry a
    /// structured detail, which is kept as compact JSON.
    pub(crate) fn detail_text(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
