//! Clipboard and browser access.

use crate::error::ActionError;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ActionError>;
}

pub trait UrlOpener {
    fn open(&mut self, url: &str) -> Result<(), ActionError>;
}

/// System clipboard via `arboard`. The handle is created on first use and
/// kept alive so X11/Wayland selections outlive the write.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ActionError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ActionError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(ActionError::Clipboard("clipboard not initialized".into()));
        };
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ActionError::Clipboard(e.to_string()))
    }
}

/// Opens URLs in the user's default browser.
#[derive(Debug, Default)]
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&mut self, url: &str) -> Result<(), ActionError> {
        webbrowser::open(url).map_err(|e| ActionError::Open {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
