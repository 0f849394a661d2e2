//! LRU Ordering Module
//!
//! Ranks cache entries for eviction: least recently used first, ties broken
//! by least popular.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Recency Key ==
/// Sort key used to pick eviction victims.
///
/// Ordered ascending by `(last_accessed_at, hit_count, access_seq)`. The
/// logical sequence only matters when two entries share the same millisecond
/// and hit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyKey {
    pub last_accessed_at: u64,
    pub hit_count: u64,
    pub access_seq: u64,
}

impl RecencyKey {
    pub fn of(entry: &CacheEntry) -> Self {
        Self {
            last_accessed_at: entry.last_accessed_at,
            hit_count: entry.hit_count,
            access_seq: entry.access_seq,
        }
    }
}

impl Ord for RecencyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.last_accessed_at
            .cmp(&other.last_accessed_at)
            .then(self.hit_count.cmp(&other.hit_count))
            .then(self.access_seq.cmp(&other.access_seq))
    }
}

impl PartialOrd for RecencyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// == Eviction Order ==
/// Returns all keys ordered from first-to-evict to last-to-evict.
pub fn eviction_order(entries: &HashMap<String, CacheEntry>) -> Vec<String> {
    let mut ranked: Vec<(RecencyKey, &String)> = entries
        .iter()
        .map(|(key, entry)| (RecencyKey::of(entry), key))
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    ranked.into_iter().map(|(_, key)| key.clone()).collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(key: &str, last_accessed_at: u64, hit_count: u64, access_seq: u64) -> CacheEntry {
        let mut entry = CacheEntry::new(
            key.to_string(),
            b"1".to_vec(),
            Duration::from_secs(60),
            access_seq,
        );
        entry.last_accessed_at = last_accessed_at;
        entry.hit_count = hit_count;
        entry
    }

    fn map(entries: Vec<CacheEntry>) -> HashMap<String, CacheEntry> {
        entries.into_iter().map(|e| (e.key.clone(), e)).collect()
    }

    #[test]
    fn test_empty_order() {
        assert!(eviction_order(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_oldest_access_first() {
        let entries = map(vec![
            entry("c", 300, 0, 3),
            entry("a", 100, 0, 1),
            entry("b", 200, 0, 2),
        ]);

        assert_eq!(eviction_order(&entries), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_broken_by_hit_count() {
        let entries = map(vec![
            entry("popular", 100, 5, 1),
            entry("unpopular", 100, 1, 2),
        ]);

        assert_eq!(eviction_order(&entries), vec!["unpopular", "popular"]);
    }

    #[test]
    fn test_full_ties_broken_by_sequence() {
        let entries = map(vec![
            entry("second", 100, 0, 2),
            entry("first", 100, 0, 1),
            entry("third", 100, 0, 3),
        ]);

        assert_eq!(eviction_order(&entries), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_recency_dominates_popularity() {
        let entries = map(vec![entry("old_hot", 100, 50, 1), entry("new_cold", 200, 0, 2)]);

        assert_eq!(eviction_order(&entries), vec!["old_hot", "new_cold"]);
    }
}
