//! Full-text view of one log entry's diagnostic, with copy and
//! "ask an assistant" handoff.

use std::time::{Duration, Instant};

use crate::error::ActionError;
use crate::platform::{Clipboard, UrlOpener};
use crate::registry::ErrorRegistry;

/// Shown when the registry has nothing for the requested id.
pub const FALLBACK_TEXT: &str = "Error details not found.";

pub const DEFAULT_ASSISTANT_URL: &str = "https://ai.dangbei.com/";

/// How long an action's feedback label stays before reverting.
pub const LABEL_REVERT_AFTER: Duration = Duration::from_secs(2);

const COPY_LABEL: &str = "Copy error";
const ASK_LABEL: &str = "Copy error and ask AI";

/// Wrap diagnostic text in the question handed to the assistant.
pub fn compose_query(error_text: &str) -> String {
    format!(
        "I ran into an error while calling a Gemini model through the Gemini API. \
         The error was:\n\n---\n{error_text}\n---\n\n\
         Please help me analyze the likely causes and how to fix it."
    )
}

/// A button caption that temporarily shows feedback.
#[derive(Debug, Clone)]
pub struct ActionLabel {
    default: &'static str,
    transient: Option<(&'static str, Instant)>,
}

impl ActionLabel {
    fn new(default: &'static str) -> Self {
        Self {
            default,
            transient: None,
        }
    }

    fn flash(&mut self, text: &'static str, now: Instant) {
        self.transient = Some((text, now + LABEL_REVERT_AFTER));
    }

    pub fn current(&self, now: Instant) -> &'static str {
        match self.transient {
            Some((text, until)) if now < until => text,
            _ => self.default,
        }
    }
}

/// Result of a best-effort action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFeedback {
    Copied,
    Redirected { url: String },
    Failed(ActionError),
    /// Nothing is open, so there was nothing to act on.
    NotOpen,
}

#[derive(Debug, Clone)]
struct OpenDiagnostic {
    log_id: String,
    text: String,
}

pub struct DiagnosticModalController {
    current: Option<OpenDiagnostic>,
    assistant_url: String,
    copy_label: ActionLabel,
    ask_label: ActionLabel,
}

impl Default for DiagnosticModalController {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_URL)
    }
}

impl DiagnosticModalController {
    pub fn new(assistant_url: impl Into<String>) -> Self {
        Self {
            current: None,
            assistant_url: assistant_url.into(),
            copy_label: ActionLabel::new(COPY_LABEL),
            ask_label: ActionLabel::new(ASK_LABEL),
        }
    }

    /// Open the diagnostic for `log_id`, falling back to
    /// [`FALLBACK_TEXT`] when the registry has no entry.
    pub fn open(&mut self, registry: &ErrorRegistry, log_id: &str) -> &str {
        let text = registry.get(log_id).unwrap_or(FALLBACK_TEXT).to_string();
        let current = self.current.insert(OpenDiagnostic {
            log_id: log_id.to_string(),
            text,
        });
        &current.text
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn log_id(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.log_id.as_str())
    }

    /// Text currently on display.
    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.text.as_str())
    }

    pub fn copy_label(&self, now: Instant) -> &'static str {
        self.copy_label.current(now)
    }

    pub fn ask_label(&self, now: Instant) -> &'static str {
        self.ask_label.current(now)
    }

    /// Copy the displayed text.
    pub fn copy_error(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> ActionFeedback {
        let Some(current) = &self.current else {
            return ActionFeedback::NotOpen;
        };
        match clipboard.set_text(&current.text) {
            Ok(()) => {
                self.copy_label.flash("Copied", now);
                ActionFeedback::Copied
            }
            Err(err) => {
                tracing::warn!(error = %err, "copying diagnostic failed");
                self.copy_label.flash("Copy failed", now);
                ActionFeedback::Failed(err)
            }
        }
    }

    /// Copy the displayed text wrapped in [`compose_query`], then open the
    /// assistant.
    pub fn ask_assistant(
        &mut self,
        clipboard: &mut dyn Clipboard,
        opener: &mut dyn UrlOpener,
        now: Instant,
    ) -> ActionFeedback {
        let Some(current) = &self.current else {
            return ActionFeedback::NotOpen;
        };
        let query = compose_query(&current.text);
        if let Err(err) = clipboard.set_text(&query) {
            tracing::warn!(error = %err, "copying assistant query failed");
            self.ask_label.flash("Copy failed", now);
            return ActionFeedback::Failed(err);
        }
        self.ask_label.flash("Opening assistant", now);
        match opener.open(&self.assistant_url) {
            Ok(()) => ActionFeedback::Redirected {
                url: self.assistant_url.clone(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "opening assistant failed");
                self.ask_label.flash("Open failed", now);
                ActionFeedback::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fakes::{MemoryClipboard, RecordingOpener};
    use pretty_assertions::assert_eq;

    fn registry() -> ErrorRegistry {
        let mut registry = ErrorRegistry::new();
        registry.record("log-1", "500 Internal\nstack line");
        registry
    }

    #[test]
    fn open_shows_full_text_or_fallback() {
        let registry = registry();
        let mut modal = DiagnosticModalController::default();
        assert_eq!(modal.open(&registry, "log-1"), "500 Internal\nstack line");
        assert_eq!(modal.log_id(), Some("log-1"));
        assert_eq!(modal.open(&registry, "log-404"), FALLBACK_TEXT);
        modal.close();
        assert!(!modal.is_open());
    }

    #[test]
    fn copy_flashes_label_then_reverts() {
        let registry = registry();
        let mut modal = DiagnosticModalController::default();
        let mut clipboard = MemoryClipboard::default();
        let now = Instant::now();
        modal.open(&registry, "log-1");

        assert_eq!(modal.copy_error(&mut clipboard, now), ActionFeedback::Copied);
        assert_eq!(clipboard.contents.as_deref(), Some("500 Internal\nstack line"));
        assert_eq!(modal.copy_label(now + Duration::from_millis(1999)), "Copied");
        assert_eq!(modal.copy_label(now + LABEL_REVERT_AFTER), COPY_LABEL);
    }

    #[test]
    fn clipboard_failure_is_absorbed() {
        let registry = registry();
        let mut modal = DiagnosticModalController::default();
        let mut clipboard = MemoryClipboard {
            broken: true,
            ..Default::default()
        };
        let mut opener = RecordingOpener::default();
        let now = Instant::now();
        modal.open(&registry, "log-1");

        assert!(matches!(
            modal.copy_error(&mut clipboard, now),
            ActionFeedback::Failed(ActionError::Clipboard(_))
        ));
        assert_eq!(modal.copy_label(now), "Copy failed");

        assert!(matches!(
            modal.ask_assistant(&mut clipboard, &mut opener, now),
            ActionFeedback::Failed(_)
        ));
        assert!(opener.opened.is_empty());
        assert_eq!(modal.ask_label(now), "Copy failed");
        assert_eq!(modal.ask_label(now + LABEL_REVERT_AFTER), ASK_LABEL);
    }

    #[test]
    fn ask_copies_query_and_opens_assistant() {
        let registry = registry();
        let mut modal = DiagnosticModalController::new("https://assistant.example/");
        let mut clipboard = MemoryClipboard::default();
        let mut opener = RecordingOpener::default();
        let now = Instant::now();
        modal.open(&registry, "log-1");

        let feedback = modal.ask_assistant(&mut clipboard, &mut opener, now);

        assert_eq!(
            feedback,
            ActionFeedback::Redirected {
                url: "https://assistant.example/".into()
            }
        );
        assert_eq!(opener.opened, vec!["https://assistant.example/".to_string()]);
        let query = clipboard.contents.unwrap();
        assert!(query.contains("---\n500 Internal\nstack line\n---"));
        assert_eq!(modal.ask_label(now), "Opening assistant");
    }

    #[test]
    fn actions_on_closed_modal_do_nothing() {
        let mut modal = DiagnosticModalController::default();
        let mut clipboard = MemoryClipboard::default();
        assert_eq!(
            modal.copy_error(&mut clipboard, Instant::now()),
            ActionFeedback::NotOpen
        );
        assert_eq!(clipboard.contents, None);
    }
}
