//! Plain-text rendering of the console's views.

use std::fmt::Write as _;

use crate::error::KeyCheckError;
use crate::key_check::KeyValidationController;
use crate::status::StatusReport;
use crate::view::{Banner, LogCard, LogView};

pub const NO_LOGS_TEXT: &str = "No logs yet";

pub fn card(card: &LogCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", card.timestamp, card.id);
    let _ = writeln!(out, "  model:  {}", card.model);
    let _ = writeln!(out, "  status: {}", card.status);
    let _ = writeln!(out, "  key:    {}", card.key_label);
    let _ = writeln!(out, "  stream: {}", if card.stream { "yes" } else { "no" });
    if let Some(preview) = &card.error_preview {
        let _ = writeln!(out, "  error:  {preview}");
    }
    if card.inspectable {
        let _ = writeln!(out, "  (show {} for the full error)", card.id);
    }
    out
}

pub fn banner(banner: &Banner) -> String {
    match banner {
        Banner::Placeholder => NO_LOGS_TEXT.to_string(),
        Banner::Error(err) => {
            format!("Failed to load logs: {err}. Check the auth key or network connection.")
        }
    }
}

/// The whole view: banner first, then cards newest first.
pub fn log_view(view: &LogView) -> String {
    let mut out = String::new();
    if let Some(b) = view.banner() {
        let _ = writeln!(out, "{}", banner(b));
    }
    for c in view.cards() {
        out.push_str(&card(c));
    }
    out
}

pub fn status(report: &StatusReport) -> String {
    match report {
        StatusReport::Healthy { key_count } => {
            format!("{} - {key_count} keys configured", report.headline())
        }
        StatusReport::Unavailable(_) => report.headline(),
    }
}

/// Key check outcome, with invalid keys masked.
pub fn key_check(controller: &KeyValidationController) -> String {
    if controller.is_busy() {
        return "Checking keys, please wait...".to_string();
    }
    if let Some(err) = controller.last_error() {
        return key_check_error(err);
    }
    let Some(result) = controller.result() else {
        return String::new();
    };
    let mut out = String::from("Check complete\n");
    let _ = writeln!(out, "  valid keys:   {}", result.valid_keys.len());
    let _ = writeln!(out, "  invalid keys: {}", result.invalid_keys.len());
    if result.invalid_keys.is_empty() {
        out.push_str("All keys are valid!\n");
    } else {
        out.push_str("Invalid keys:\n");
        for masked in controller.masked_invalid_keys() {
            let _ = writeln!(out, "  - {masked}");
        }
    }
    out
}

pub fn key_check_error(err: &KeyCheckError) -> String {
    format!("Error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::test_support::{FakeApi, log_entry};
    use crate::types::LogStatus;
    use crate::view::RenderInstruction;

    #[test]
    fn card_shows_preview_and_affordance() {
        let mut entry = log_entry("log-9");
        entry.status = LogStatus::Failed;
        entry.key_used = None;
        entry.error_info = Some("403 forbidden\nmore".into());
        let text = card(&LogCard::from_entry(&entry));
        assert!(text.contains("key:    N/A"));
        assert!(text.contains("error:  403 forbidden..."));
        assert!(text.contains("show log-9"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn view_puts_banner_above_cards() {
        let mut view = LogView::new();
        view.apply(RenderInstruction::Prepend(LogCard::from_entry(&log_entry("a"))));
        view.apply(RenderInstruction::ShowError(SyncError::Unauthorized));
        let text = log_view(&view);
        assert!(text.starts_with("Failed to load logs: authorization code invalid or missing"));
        assert!(text.contains("] a\n"));
    }

    #[tokio::test]
    async fn key_check_report_masks_invalid_keys() {
        let api = FakeApi::with_keys(&["v1-aaaaaaaaaa"], &["sk-ABCDEFGHIJKL"]);
        let mut controller = KeyValidationController::new();
        controller.check_keys(&api, None).await.unwrap();
        let text = key_check(&controller);
        assert!(text.contains("valid keys:   1"));
        assert!(text.contains("- sk-A...IJKL"));
        assert!(!text.contains("sk-ABCDEFGHIJKL"));
    }

    #[tokio::test]
    async fn key_check_report_all_valid() {
        let api = FakeApi::with_keys(&["v1-aaaaaaaaaa"], &[]);
        let mut controller = KeyValidationController::new();
        controller.check_keys(&api, None).await.unwrap();
        assert!(key_check(&controller).contains("All keys are valid!"));
    }
}
