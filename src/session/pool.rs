use std::collections::BTreeMap;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::collection::WordCollection;
use crate::engine::word::WordEntry;

/// The whole collection.
pub const FULL_RANGE: Range<usize> = 0..usize::MAX;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Random,
    Sequential,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Random => "random",
            Policy::Sequential => "sequential",
        }
    }
}

/// Entries selected for one drill run.
///
/// `members` answers random draws, `order` plus `cursor` answers sequential
/// ones. Every entry in `order` is also in `members`.
#[derive(Clone, Debug, Default)]
pub struct DrillPool {
    members: BTreeMap<String, WordEntry>,
    order: Vec<WordEntry>,
    cursor: usize,
}

impl DrillPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `collection[range]` (clamped) skipping words already pooled.
    /// Returns how many entries were added.
    pub fn add_range(&mut self, collection: &WordCollection, range: Range<usize>) -> usize {
        let entries = collection.entries();
        let end = range.end.min(entries.len());
        let start = range.start.min(end);

        let mut added = 0;
        for entry in &entries[start..end] {
            if self.members.contains_key(entry.key()) {
                continue;
            }
            self.members.insert(entry.key().to_string(), entry.clone());
            self.order.push(entry.clone());
            added += 1;
        }
        added
    }

    /// Uniform draw over the remaining members.
    pub fn next_random<R: Rng>(&self, rng: &mut R) -> Option<&WordEntry> {
        if self.members.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.members.len());
        self.members.values().nth(idx)
    }

    pub fn next_sequential(&self) -> Option<&WordEntry> {
        self.order.get(self.cursor)
    }

    pub fn next<R: Rng>(&self, policy: Policy, rng: &mut R) -> Option<&WordEntry> {
        match policy {
            Policy::Random => self.next_random(rng),
            Policy::Sequential => self.next_sequential(),
        }
    }

    /// Record the outcome for the word just asked.
    ///
    /// A sequential miss moves the word at the cursor to the back without
    /// advancing. A random miss leaves the word drawable.
    pub fn on_answered(&mut self, policy: Policy, foreign: &str, first_try: bool) {
        match (policy, first_try) {
            (Policy::Sequential, true) => {
                if self.cursor < self.order.len() {
                    self.cursor += 1;
                }
            }
            (Policy::Sequential, false) => {
                if self.cursor < self.order.len() {
                    let word = self.order.remove(self.cursor);
                    self.order.push(word);
                }
            }
            (Policy::Random, true) => {
                if self.members.remove(foreign).is_some() {
                    if let Some(pos) = self.order.iter().position(|e| e.key() == foreign) {
                        self.order.remove(pos);
                        if pos < self.cursor {
                            self.cursor -= 1;
                        }
                    }
                }
            }
            (Policy::Random, false) => {}
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn order(&self) -> &[WordEntry] {
        &self.order
    }

    pub fn contains(&self, foreign: &str) -> bool {
        self.members.contains_key(foreign)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn book(name: &str, words: &[(&str, &str)]) -> WordCollection {
        WordCollection::from_entries(
            name,
            words.iter().map(|(f, n)| WordEntry::new(*f, *n)).collect(),
        )
    }

    fn order_keys(pool: &DrillPool) -> Vec<&str> {
        pool.order().iter().map(|e| e.key()).collect()
    }

    #[test]
    fn test_add_range_clamps_and_dedups() {
        let first = book("one", &[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        let second = book("two", &[("c", "3"), ("e", "5")]);

        let mut pool = DrillPool::new();
        assert_eq!(pool.add_range(&first, 1..3), 2);
        assert_eq!(pool.add_range(&second, FULL_RANGE), 1);
        assert_eq!(pool.add_range(&first, 10..20), 0);
        assert_eq!(order_keys(&pool), vec!["b", "c", "e"]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_inverted_range_adds_nothing() {
        let first = book("one", &[("a", "1"), ("b", "2")]);
        let mut pool = DrillPool::new();
        let (from, to) = (2, 1);
        assert_eq!(pool.add_range(&first, from..to), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_sequential_correct_advances_cursor() {
        let first = book("one", &[("a", "1"), ("b", "2")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);

        assert_eq!(pool.next_sequential().unwrap().foreign, "a");
        pool.on_answered(Policy::Sequential, "a", true);
        assert_eq!(pool.next_sequential().unwrap().foreign, "b");
        pool.on_answered(Policy::Sequential, "b", true);
        assert!(pool.next_sequential().is_none());
        assert_eq!(pool.cursor(), pool.order().len());

        // Past the end the cursor stays put.
        pool.on_answered(Policy::Sequential, "b", true);
        assert_eq!(pool.cursor(), 2);
    }

    #[test]
    fn test_sequential_retry_requeues_to_back() {
        let first = book("one", &[("cat", "猫"), ("dog", "狗"), ("fish", "鱼")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);

        pool.on_answered(Policy::Sequential, "cat", false);
        assert_eq!(pool.cursor(), 0);
        assert_eq!(order_keys(&pool), vec!["dog", "fish", "cat"]);
        assert_eq!(pool.next_sequential().unwrap().foreign, "dog");
    }

    #[test]
    fn test_random_correct_removes_member() {
        let first = book("one", &[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);
        let mut rng = SmallRng::seed_from_u64(7);

        pool.on_answered(Policy::Random, "b", true);
        assert!(!pool.contains("b"));
        assert_eq!(order_keys(&pool), vec!["a", "c"]);
        for _ in 0..100 {
            assert_ne!(pool.next_random(&mut rng).unwrap().foreign, "b");
        }
    }

    #[test]
    fn test_random_retry_keeps_member() {
        let first = book("one", &[("a", "甲")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);
        let mut rng = SmallRng::seed_from_u64(1);

        pool.on_answered(Policy::Random, "a", false);
        assert!(pool.contains("a"));
        assert_eq!(pool.next_random(&mut rng).unwrap().foreign, "a");
    }

    #[test]
    fn test_random_removal_keeps_cursor_on_same_word() {
        let first = book("one", &[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);
        pool.on_answered(Policy::Sequential, "a", true);
        pool.on_answered(Policy::Sequential, "b", true);
        assert_eq!(pool.next_sequential().unwrap().foreign, "c");

        pool.on_answered(Policy::Random, "a", true);
        assert_eq!(pool.cursor(), 1);
        assert_eq!(pool.next_sequential().unwrap().foreign, "c");
    }

    #[test]
    fn test_random_draw_on_empty_pool() {
        let pool = DrillPool::new();
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(pool.next_random(&mut rng).is_none());
        assert!(pool.next_sequential().is_none());
    }

    #[test]
    fn test_random_draw_reaches_every_member() {
        let first = book("one", &[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut pool = DrillPool::new();
        pool.add_range(&first, FULL_RANGE);
        let mut rng = SmallRng::seed_from_u64(11);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pool.next_random(&mut rng).unwrap().foreign.clone());
        }
        assert_eq!(seen.len(), 3);
    }
}
