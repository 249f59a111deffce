use std::collections::BTreeMap;
use std::fs;

use tracing::{info, warn};

use crate::engine::collection::WordCollection;
use crate::engine::word::WordEntry;
use crate::error::DrillError;

/// What a successful load produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadSummary {
    pub word_count: usize,
    pub malformed: usize,
    pub replaced: bool,
}

/// Every loaded word book, keyed by source name.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, WordCollection>,
    default_name: Option<String>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the source file `name`, replacing any collection held
    /// under that name. On failure the registry is left untouched.
    pub fn load(&mut self, name: &str, silent: bool) -> Result<LoadSummary, DrillError> {
        let bytes = fs::read(name).map_err(|source| DrillError::SourceUnreadable {
            name: name.to_string(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.load_str(name, &text, silent))
    }

    /// Parse already-read source text under `name`.
    pub fn load_str(&mut self, name: &str, source: &str, silent: bool) -> LoadSummary {
        let (collection, malformed) = WordCollection::parse(name, source);
        for line in &malformed {
            warn!(
                "book:{} invalid word at line {} ({}): {}",
                name,
                line.line_no,
                line.reason.as_str(),
                line.text
            );
        }
        let word_count = collection.len();
        let replaced = self.insert(collection);
        if !silent {
            info!("read {name} completed, word count:{word_count}");
        }
        LoadSummary {
            word_count,
            malformed: malformed.len(),
            replaced,
        }
    }

    /// Store `collection` under its name. Returns true if one was replaced.
    pub fn insert(&mut self, collection: WordCollection) -> bool {
        let name = collection.name.clone();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        let replaced = self.collections.insert(name.clone(), collection).is_some();
        if replaced {
            info!("update wordbook:{name}");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&WordCollection> {
        self.collections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// The first collection ever loaded. Never changes afterwards.
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn collections(&self) -> impl Iterator<Item = &WordCollection> {
        self.collections.values()
    }

    /// Total size across collections, counting shared words once per book.
    pub fn word_count(&self) -> usize {
        self.collections.values().map(WordCollection::len).sum()
    }

    /// Distinct entries across every collection, sorted by foreign term.
    /// Books are visited in name order and the first entry for a term wins.
    pub fn unique_entries(&self) -> Vec<&WordEntry> {
        let mut by_key: BTreeMap<&str, &WordEntry> = BTreeMap::new();
        for collection in self.collections.values() {
            for entry in collection.entries() {
                by_key.entry(entry.key()).or_insert(entry);
            }
        }
        by_key.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_default_name_is_first_loaded() {
        let mut registry = CollectionRegistry::new();
        registry.load_str("b.txt", "x | 1\n", true);
        registry.load_str("a.txt", "y | 2\n", true);
        assert_eq!(registry.default_name(), Some("b.txt"));
    }

    #[test]
    fn test_reload_replaces_same_name() {
        let mut registry = CollectionRegistry::new();
        let first = registry.load_str("book", "a | 1\nb | 2\n", false);
        assert!(!first.replaced);
        let second = registry.load_str("book", "c | 3\n", false);
        assert!(second.replaced);
        assert_eq!(registry.get("book").unwrap().len(), 1);
        assert_eq!(registry.word_count(), 1);
    }

    #[test]
    fn test_word_count_sums_books() {
        let mut registry = CollectionRegistry::new();
        registry.load_str("one", "a | 1\nb | 2\n", true);
        registry.load_str("two", "b | 2\nc | 3\n", true);
        assert_eq!(registry.word_count(), 4);
        assert_eq!(registry.unique_entries().len(), 3);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "cat | 猫\nbroken\ndog\t狗\n").unwrap();
        let name = path.to_string_lossy().to_string();

        let mut registry = CollectionRegistry::new();
        let summary = registry.load(&name, false).unwrap();
        assert_eq!(summary.word_count, 2);
        assert_eq!(summary.malformed, 1);
        assert!(registry.contains(&name));
    }

    #[test]
    fn test_unreadable_source_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let mut registry = CollectionRegistry::new();
        registry.load_str("kept", "a | 1\n", true);
        let err = registry
            .load(&missing.to_string_lossy(), false)
            .unwrap_err();
        assert!(matches!(err, DrillError::SourceUnreadable { .. }));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["kept"]);
        assert_eq!(registry.default_name(), Some("kept"));
    }
}
