use std::collections::HashSet;

use crate::engine::word::{LineError, WordEntry};

/// A line skipped while parsing a word book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedLine {
    pub line_no: usize,
    pub text: String,
    pub reason: LineError,
}

/// A named word book. Entries are unique by foreign term, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct WordCollection {
    pub name: String,
    entries: Vec<WordEntry>,
}

impl WordCollection {
    /// Parse source text. Later duplicates of a foreign term are dropped
    /// silently; malformed lines are returned for the caller to report.
    pub fn parse(name: &str, source: &str) -> (Self, Vec<MalformedLine>) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();
        let mut malformed = Vec::new();

        for (idx, line) in source.lines().enumerate() {
            match WordEntry::parse_line(line) {
                Ok(Some(entry)) => {
                    if seen.insert(entry.key().to_string()) {
                        entries.push(entry);
                    }
                }
                Ok(None) => {}
                Err(reason) => malformed.push(MalformedLine {
                    line_no: idx + 1,
                    text: line.to_string(),
                    reason,
                }),
            }
        }

        (
            Self {
                name: name.to_string(),
                entries,
            },
            malformed,
        )
    }

    pub fn from_entries(name: &str, entries: Vec<WordEntry>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| e.is_valid() && seen.insert(e.key().to_string()))
            .collect();
        Self {
            name: name.to_string(),
            entries,
        }
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
