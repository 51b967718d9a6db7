//! Bearer token wrapper that keeps the proxy secret out of logs.

use std::fmt;
use std::str::FromStr;

/// The proxy's admin secret, sent as `Authorization: Bearer <token>`.
///
/// Debug and Display print `[REDACTED]`; the value is only reachable
/// through [`AuthToken::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    inner: String,
}

impl AuthToken {
    /// Wrap a token. Surrounding whitespace is dropped; an empty token
    /// means "no token" and yields `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            inner: trimmed.to_string(),
        })
    }

    /// The raw token. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    pub(crate) fn bearer_value(&self) -> String {
        format!("Bearer {}", self.inner)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl FromStr for AuthToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthToken::new(s).ok_or_else(|| "auth token must not be empty".to_string())
    }
}
