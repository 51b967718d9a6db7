use std::collections::HashMap;

/// Full diagnostic text per log id, kept for the lifetime of the session.
///
/// Written once per id on first sight; later writes for the same id are
/// ignored. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct ErrorRegistry {
    entries: HashMap<String, String>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` for `id` unless the id is already known. Returns
    /// whether the text was stored.
    pub fn record(&mut self, id: &str, text: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), text.to_string());
        true
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
