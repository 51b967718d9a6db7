//! Display surface for the log feed.
//!
//! The synchronizer never touches the view directly; it emits
//! [`RenderInstruction`]s which [`LogView::apply`] folds into an ordered
//! card list (newest first) and a single banner slot.

use crate::error::SyncError;
use crate::types::{LogEntry, LogStatus};

/// Shown inline in place of a missing `key_used`.
pub const KEY_PLACEHOLDER: &str = "N/A";

/// Rendered form of one [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCard {
    pub id: String,
    pub timestamp: String,
    pub model: String,
    pub status: LogStatus,
    pub key_label: String,
    pub stream: bool,
    /// First line of `error_info` followed by `...`.
    pub error_preview: Option<String>,
    /// Failed entries with diagnostic text can be opened in the
    /// diagnostic view.
    pub inspectable: bool,
}

impl LogCard {
    pub fn from_entry(entry: &LogEntry) -> Self {
        let error_preview = entry
            .error_info
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(error_preview);
        Self {
            id: entry.id.clone(),
            timestamp: entry.timestamp.clone(),
            model: entry.model.clone(),
            status: entry.status,
            key_label: entry
                .key_used
                .clone()
                .filter(|key| !key.is_empty())
                .unwrap_or_else(|| KEY_PLACEHOLDER.to_string()),
            stream: entry.stream,
            inspectable: error_preview.is_some() && entry.status == LogStatus::Failed,
            error_preview,
        }
    }
}

/// Inline preview of a diagnostic: its first line, always followed by an
/// ellipsis, even when the text is a single line.
pub fn error_preview(error_info: &str) -> String {
    let first_line = error_info.split('\n').next().unwrap_or_default();
    format!("{}...", first_line.trim_end_matches('\r'))
}

/// Content of the view's banner slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// "No logs yet", shown when the first feed is empty.
    Placeholder,
    /// The last synchronization failed.
    Error(SyncError),
}

/// One change to the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    ShowPlaceholder,
    ClearBanner,
    /// Insert a card above every card already shown.
    Prepend(LogCard),
    ShowError(SyncError),
}

/// In-memory display surface.
#[derive(Debug, Default)]
pub struct LogView {
    cards: Vec<LogCard>,
    banner: Option<Banner>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, instruction: RenderInstruction) {
        match instruction {
            RenderInstruction::ShowPlaceholder => self.banner = Some(Banner::Placeholder),
            RenderInstruction::ClearBanner => self.banner = None,
            RenderInstruction::Prepend(card) => self.cards.insert(0, card),
            RenderInstruction::ShowError(err) => self.banner = Some(Banner::Error(err)),
        }
    }

    pub fn apply_all(&mut self, instructions: impl IntoIterator<Item = RenderInstruction>) {
        for instruction in instructions {
            self.apply(instruction);
        }
    }

    /// Cards, newest first.
    pub fn cards(&self) -> &[LogCard] {
        &self.cards
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn card(&self, id: &str) -> Option<&LogCard> {
        self.cards.iter().find(|card| card.id == id)
    }
}
