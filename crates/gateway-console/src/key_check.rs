//! Batch key validation.
//!
//! A check runs in three steps so the session can keep its event loop free
//! while the proxy probes every key:
//!
//! 1. [`KeyValidationController::begin`] disables the trigger, shows the
//!    busy indicator and clears the previous result;
//! 2. [`KeyValidationController::run`] issues the request (may run on a
//!    spawned task);
//! 3. [`KeyValidationController::complete`] stores the new result.
//!
//! The busy flag is owned by a drop guard carried through all three steps,
//! so the trigger comes back on every exit path, including a cancelled or
//! panicked task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ConsoleApi;
use crate::error::{ActionError, KeyCheckError};
use crate::platform::Clipboard;
use crate::secrets::AuthToken;
use crate::types::KeyCheckResult;

const MASK_EDGE: usize = 4;

/// Display form of a key: first and last four characters around an
/// ellipsis. Keys too short to hide anything are fully masked.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MASK_EDGE * 2 {
        return "****".to_string();
    }
    let head: String = chars[..MASK_EDGE].iter().collect();
    let tail: String = chars[chars.len() - MASK_EDGE..].iter().collect();
    format!("{head}...{tail}")
}

struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Permission to run one check, issued by [`KeyValidationController::begin`].
pub struct CheckTicket {
    guard: BusyGuard,
}

/// A finished request waiting to be applied.
pub struct CheckCompletion {
    guard: BusyGuard,
    outcome: Result<KeyCheckResult, KeyCheckError>,
}

impl CheckCompletion {
    pub fn outcome(&self) -> &Result<KeyCheckResult, KeyCheckError> {
        &self.outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyInvalidFeedback {
    Copied { count: usize },
    NothingToCopy,
    Failed(ActionError),
}

#[derive(Default)]
pub struct KeyValidationController {
    busy: Arc<AtomicBool>,
    result: Option<KeyCheckResult>,
    last_error: Option<KeyCheckError>,
}

impl KeyValidationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a check is in flight (trigger disabled, busy indicator on).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start a check. Returns `None` while another check is in flight.
    pub fn begin(&mut self) -> Option<CheckTicket> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        self.result = None;
        self.last_error = None;
        Some(CheckTicket {
            guard: BusyGuard {
                busy: Arc::clone(&self.busy),
            },
        })
    }

    /// Issue the check request.
    pub async fn run(
        ticket: CheckTicket,
        api: &dyn ConsoleApi,
        auth: Option<&AuthToken>,
    ) -> CheckCompletion {
        tracing::info!(authenticated = auth.is_some(), "checking keys");
        let outcome = api.check_keys(auth).await.map_err(KeyCheckError::from);
        match &outcome {
            Ok(result) => tracing::info!(
                valid = result.valid_keys.len(),
                invalid = result.invalid_keys.len(),
                "key check finished"
            ),
            Err(err) => tracing::warn!(error = %err, "key check failed"),
        }
        CheckCompletion {
            guard: ticket.guard,
            outcome,
        }
    }

    /// Apply a finished check, replacing any earlier result.
    pub fn complete(
        &mut self,
        completion: CheckCompletion,
    ) -> Result<&KeyCheckResult, KeyCheckError> {
        let CheckCompletion { guard, outcome } = completion;
        drop(guard);
        match outcome {
            Ok(result) => {
                self.last_error = None;
                let stored: &KeyCheckResult = self.result.insert(result);
                Ok(stored)
            }
            Err(err) => {
                self.result = None;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// `begin`, `run` and `complete` in one call.
    pub async fn check_keys(
        &mut self,
        api: &dyn ConsoleApi,
        auth: Option<&AuthToken>,
    ) -> Result<&KeyCheckResult, KeyCheckError> {
        let Some(ticket) = self.begin() else {
            return Err(KeyCheckError::InProgress);
        };
        let completion = Self::run(ticket, api, auth).await;
        self.complete(completion)
    }

    pub fn result(&self) -> Option<&KeyCheckResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&KeyCheckError> {
        self.last_error.as_ref()
    }

    /// Invalid keys of the current result, masked for display.
    pub fn masked_invalid_keys(&self) -> Vec<String> {
        self.result
            .iter()
            .flat_map(|r| r.invalid_keys.iter())
            .map(|key| mask_key(key))
            .collect()
    }

    /// Copy the full invalid keys, comma-joined.
    pub fn copy_invalid_keys(&self, clipboard: &mut dyn Clipboard) -> CopyInvalidFeedback {
        let Some(result) = self.result.as_ref().filter(|r| !r.invalid_keys.is_empty()) else {
            return CopyInvalidFeedback::NothingToCopy;
        };
        match clipboard.set_text(&result.invalid_keys.join(",")) {
            Ok(()) => CopyInvalidFeedback::Copied {
                count: result.invalid_keys.len(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "copying invalid keys failed");
                CopyInvalidFeedback::Failed(err)
            }
        }
    }
}
