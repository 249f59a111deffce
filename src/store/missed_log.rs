use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::engine::word::WordEntry;
use crate::store::export::format_entry;

const MISSED_WIDTH: usize = 30;

/// Append-only log of missed words, unique by foreign term across runs.
/// Lines use the word book format so the log can be loaded for review.
pub struct MissedLog {
    path: PathBuf,
    persisted: HashSet<String>,
}

impl MissedLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let persisted = read_keys(&path);
        Self { path, persisted }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, foreign: &str) -> bool {
        self.persisted.contains(foreign)
    }

    pub fn len(&self) -> usize {
        self.persisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persisted.is_empty()
    }

    /// Returns false when the word was already logged.
    pub fn append(&mut self, entry: &WordEntry) -> Result<bool> {
        Ok(self.flush(std::iter::once(entry))? == 1)
    }

    /// Write every entry not logged yet. Returns how many were written.
    pub fn flush<'a>(&mut self, entries: impl IntoIterator<Item = &'a WordEntry>) -> Result<usize> {
        let fresh: Vec<&WordEntry> = entries
            .into_iter()
            .filter(|e| !self.persisted.contains(e.key()))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {} failed", self.path.display()))?;
        let mut written = 0;
        for entry in fresh {
            if !self.persisted.insert(entry.key().to_string()) {
                continue;
            }
            writeln!(file, "{}", format_entry(entry, MISSED_WIDTH))?;
            written += 1;
        }
        Ok(written)
    }
}

fn read_keys(path: &Path) -> HashSet<String> {
    let content = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            if path.exists() {
                warn!("read {} failed: {err}", path.display());
            }
            return HashSet::new();
        }
    };
    content
        .lines()
        .filter_map(|line| WordEntry::parse_line(line).ok().flatten())
        .map(|entry| entry.foreign)
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_append_skips_logged_words() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.txt");
        let mut log = MissedLog::open(&path);
        assert!(log.is_empty());

        assert!(log.append(&WordEntry::new("cat", "猫")).unwrap());
        assert!(!log.append(&WordEntry::new("cat", "猫")).unwrap());
        assert!(log.append(&WordEntry::new("dog", "狗")).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_dedup_against_prior_runs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.txt");
        fs::write(&path, "cat                            | 猫\n").unwrap();

        let mut log = MissedLog::open(&path);
        assert!(log.contains("cat"));
        let missed = [WordEntry::new("cat", "猫"), WordEntry::new("fish", "鱼")];
        assert_eq!(log.flush(missed.iter()).unwrap(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("cat"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_log_reloads_as_word_book() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.txt");
        let mut log = MissedLog::open(&path);
        log.append(&WordEntry::new("ice cream", "冰淇淋")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let entry = WordEntry::parse_line(content.lines().next().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(entry, WordEntry::new("ice cream", "冰淇淋"));
    }

    #[test]
    fn test_flush_nothing_creates_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.txt");
        let mut log = MissedLog::open(&path);
        assert_eq!(log.flush(std::iter::empty()).unwrap(), 0);
        assert!(!path.exists());
    }
}
