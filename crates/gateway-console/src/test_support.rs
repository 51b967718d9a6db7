//! Canned [`ConsoleApi`] for component tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ConsoleApi;
use crate::error::{ConsoleError, Result};
use crate::secrets::AuthToken;
use crate::types::{KeyCheckResult, LogEntry, LogStatus, ServiceStatus};

#[derive(Debug, Clone)]
pub(crate) enum Fail {
    Unauthorized,
    RateLimited,
    Status(u16, Option<&'static str>),
}

impl Fail {
    fn to_error(&self) -> ConsoleError {
        match self {
            Fail::Unauthorized => ConsoleError::Unauthorized,
            Fail::RateLimited => ConsoleError::RateLimited,
            Fail::Status(status, detail) => ConsoleError::Status {
                status: *status,
                detail: detail.map(str::to_string),
            },
        }
    }
}

pub(crate) struct FakeApi {
    logs: Mutex<std::result::Result<Vec<LogEntry>, Fail>>,
    keys: Mutex<std::result::Result<KeyCheckResult, Fail>>,
    status: Mutex<std::result::Result<ServiceStatus, Fail>>,
    /// Bearer tokens seen by `check_keys`, in call order.
    pub(crate) seen_auth: Mutex<Vec<Option<String>>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            logs: Mutex::new(Ok(Vec::new())),
            keys: Mutex::new(Ok(KeyCheckResult::default())),
            status: Mutex::new(Ok(ServiceStatus {
                key_count: 0,
                status: Some("ok".into()),
                service: None,
            })),
            seen_auth: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_logs(entries: Vec<LogEntry>) -> Self {
        let api = Self::new();
        *api.logs.lock().unwrap() = Ok(entries);
        api
    }

    pub(crate) fn with_keys(valid: &[&str], invalid: &[&str]) -> Self {
        let api = Self::new();
        *api.keys.lock().unwrap() = Ok(KeyCheckResult {
            valid_keys: valid.iter().map(|k| k.to_string()).collect(),
            invalid_keys: invalid.iter().map(|k| k.to_string()).collect(),
        });
        api
    }

    pub(crate) fn set_logs(&self, entries: Vec<LogEntry>) {
        *self.logs.lock().unwrap() = Ok(entries);
    }

    pub(crate) fn fail_logs(&self, fail: Fail) {
        *self.logs.lock().unwrap() = Err(fail);
    }

    pub(crate) fn fail_keys(&self, fail: Fail) {
        *self.keys.lock().unwrap() = Err(fail);
    }

    pub(crate) fn set_status(&self, status: std::result::Result<ServiceStatus, Fail>) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn status(&self) -> Result<ServiceStatus> {
        self.status.lock().unwrap().clone().map_err(|f| f.to_error())
    }

    async fn logs(&self) -> Result<Vec<LogEntry>> {
        self.logs.lock().unwrap().clone().map_err(|f| f.to_error())
    }

    async fn check_keys(&self, auth: Option<&AuthToken>) -> Result<KeyCheckResult> {
        self.seen_auth
            .lock()
            .unwrap()
            .push(auth.map(|t| t.expose_secret().to_string()));
        self.keys.lock().unwrap().clone().map_err(|f| f.to_error())
    }
}

pub(crate) fn log_entry(id: &str) -> LogEntry {
    LogEntry {
        id: id.to_string(),
        timestamp: "2024-05-01 12:00:00".to_string(),
        model: "gemini-1.5-flash".to_string(),
        status: LogStatus::Success,
        key_used: Some("...abcd".to_string()),
        stream: false,
        error_info: None,
    }
}
