//! Incremental log synchronization.
//!
//! Every poll fetches the whole feed. [`LogSynchronizer::merge`] folds a
//! snapshot into the session: ids already shown are skipped, new entries
//! become [`RenderInstruction::Prepend`]s (oldest first, so the view reads
//! newest first), and their diagnostic text lands in the [`ErrorRegistry`].
//!
//! Fetches may overlap (a manual refresh racing the poll tick), so each
//! one carries a [`RequestToken`]. A snapshot older than the newest one
//! already applied is dropped instead of merged.

use std::collections::HashSet;

use crate::client::ConsoleApi;
use crate::error::SyncError;
use crate::registry::ErrorRegistry;
use crate::types::LogEntry;
use crate::view::{Banner, LogCard, RenderInstruction};

/// Monotonic tag for one log fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What a merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot was merged; `added` entries were new.
    Merged { added: usize },
    /// First successful fetch and the feed was empty.
    Empty,
    /// A newer snapshot was already applied.
    Stale,
    Failed(SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub token: RequestToken,
    pub outcome: SyncOutcome,
    pub instructions: Vec<RenderInstruction>,
}

/// Owns the set of displayed ids and is the only writer of the
/// [`ErrorRegistry`].
#[derive(Debug, Default)]
pub struct LogSynchronizer {
    displayed: HashSet<String>,
    registry: ErrorRegistry,
    next_token: u64,
    latest_applied: Option<RequestToken>,
    /// What the view's banner slot currently shows, so an unchanged
    /// banner is not emitted again on every poll.
    banner: Option<Banner>,
}

impl LogSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a fetch that is about to start.
    pub fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    /// Fetch the feed and merge it.
    pub async fn sync(&mut self, api: &dyn ConsoleApi) -> SyncReport {
        let token = self.issue_token();
        let result = api.logs().await.map_err(SyncError::from);
        self.merge(token, result)
    }

    /// Merge the result of the fetch tagged `token`.
    pub fn merge(
        &mut self,
        token: RequestToken,
        result: Result<Vec<LogEntry>, SyncError>,
    ) -> SyncReport {
        if self.latest_applied.is_some_and(|latest| token <= latest) {
            tracing::debug!(token = token.value(), "dropping stale log snapshot");
            return SyncReport {
                token,
                outcome: SyncOutcome::Stale,
                instructions: Vec::new(),
            };
        }
        self.latest_applied = Some(token);

        let entries = match result {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(token = token.value(), error = %err, "log sync failed");
                let banner = Banner::Error(err.clone());
                let instructions = if self.banner.as_ref() == Some(&banner) {
                    Vec::new()
                } else {
                    self.banner = Some(banner);
                    vec![RenderInstruction::ShowError(err.clone())]
                };
                return SyncReport {
                    token,
                    outcome: SyncOutcome::Failed(err),
                    instructions,
                };
            }
        };

        let mut instructions = Vec::new();
        if self.displayed.is_empty() && entries.is_empty() {
            if self.banner != Some(Banner::Placeholder) {
                self.banner = Some(Banner::Placeholder);
                instructions.push(RenderInstruction::ShowPlaceholder);
            }
            return SyncReport {
                token,
                outcome: SyncOutcome::Empty,
                instructions,
            };
        }

        if self.banner.take().is_some() {
            instructions.push(RenderInstruction::ClearBanner);
        }

        let mut added = 0;
        // The feed is oldest first; each prepend lands above the previous
        // one, so the newest entry ends on top.
        for entry in &entries {
            if self.displayed.contains(&entry.id) {
                continue;
            }
            if let Some(error_info) = entry.error_info.as_deref().filter(|e| !e.is_empty()) {
                self.registry.record(&entry.id, error_info);
            }
            instructions.push(RenderInstruction::Prepend(LogCard::from_entry(entry)));
            self.displayed.insert(entry.id.clone());
            added += 1;
        }

        if added > 0 {
            tracing::info!(token = token.value(), added, total = self.displayed.len(), "merged log feed");
        }

        SyncReport {
            token,
            outcome: SyncOutcome::Merged { added },
            instructions,
        }
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    pub fn is_displayed(&self, id: &str) -> bool {
        self.displayed.contains(id)
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }
}
