//! Per-document scan state

use std::collections::HashSet;

/// State shared by the checks run over a single document
///
/// Holds the document's normalized format tag and the sequence of strings
/// recorded by consistency and conditional checks. Create one per document
/// and drop it when the document's scan ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    format: String,
    sequences: Vec<String>,
    /// Distinct entries of `sequences`, for membership tests
    seen: HashSet<String>,
}

impl DocumentContext {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            sequences: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Normalized format tag (e.g. `md`), selecting the masking pattern
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Everything recorded so far, in order
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if !self.seen.contains(&entry) {
            self.seen.insert(entry.clone());
        }
        self.sequences.push(entry);
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.seen.contains(entry)
    }
}
