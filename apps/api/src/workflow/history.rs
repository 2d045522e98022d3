use serde::Serialize;

/// Append-only record of cover letter versions within one session.
///
/// `append_if_new` suppresses consecutive duplicates so repeated appends of
/// the same text (UI re-renders, restores of the latest version) never pad
/// the history. No deletion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LetterHistory {
    entries: Vec<String>,
}

impl LetterHistory {
    /// Appends `text` unless it matches the latest entry.
    /// Returns whether a new version was recorded.
    pub fn append_if_new(&mut self, text: &str) -> bool {
        if self.entries.last().map(String::as_str) == Some(text) {
            return false;
        }
        self.entries.push(text.to_string());
        true
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
