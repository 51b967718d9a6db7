//! HTTP client for the proxy's admin API.

use crate::error::{ConsoleError, Result};
use crate::secrets::AuthToken;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 8;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// The three admin endpoints the console talks to.
///
/// Components depend on this trait rather than on [`ConsoleClient`] so the
/// session can share one client across spawned tasks and tests can swap in
/// canned responses.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// `GET /api/status`.
    async fn status(&self) -> Result<ServiceStatus>;

    /// `GET /api/logs`: the full feed snapshot, oldest first.
    async fn logs(&self) -> Result<Vec<LogEntry>>;

    /// `POST /api/check-keys`, authenticated with `auth` when given.
    async fn check_keys(&self, auth: Option<&AuthToken>) -> Result<KeyCheckResult>;
}

/// reqwest-backed [`ConsoleApi`].
#[derive(Clone)]
pub struct ConsoleClient {
    base_url: String,
    auth: Option<AuthToken>,
    http: Client,
}

impl ConsoleClient {
    /// Create a client for the proxy at `base_url`. `auth` is attached to
    /// log requests; key checks take their token per call.
    pub fn new(base_url: &Url, auth: Option<AuthToken>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(ConsoleError::Http)?;
        Ok(Self {
            base_url: base_url.as_str().to_string(),
            auth,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(ConsoleError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(ConsoleError::RateLimited),
            _ => {}
        }
        if !status.is_success() {
            let body = response.text().await.map_err(ConsoleError::Http)?;
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::detail_text);
            return Err(ConsoleError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.text().await.map_err(ConsoleError::Http)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ConsoleApi for ConsoleClient {
    async fn status(&self) -> Result<ServiceStatus> {
        let url = self.url("api/status")?;
        let response = self.http.get(url).send().await?;
        let response = Self::check_response(response).await?;
        Self::decode(response).await
    }

    async fn logs(&self) -> Result<Vec<LogEntry>> {
        let url = self.url("api/logs")?;
        let mut request = self.http.get(url);
        if let Some(auth) = &self.auth {
            request = request.header(reqwest::header::AUTHORIZATION, auth.bearer_value());
        }
        let response = Self::check_response(request.send().await?).await?;
        let entries: Vec<LogEntry> = Self::decode(response).await?;
        tracing::debug!(count = entries.len(), "fetched log feed");
        Ok(entries)
    }

    async fn check_keys(&self, auth: Option<&AuthToken>) -> Result<KeyCheckResult> {
        let url = self.url("api/check-keys")?;
        let mut request = self.http.post(url);
        if let Some(auth) = auth {
            request = request.header(reqwest::header::AUTHORIZATION, auth.bearer_value());
        }
        let response = Self::check_response(request.send().await?).await?;
        Self::decode(response).await
    }
}
