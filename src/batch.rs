//! Batch helpers shared by entity population and collection diffs.

use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first item for each key, preserving input order.
pub fn dedupe_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key_fn(item)))
        .collect()
}

/// Splits `items` into chunks of at most `size` (a size of 0 is treated as 1).
pub fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);

    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let unique = dedupe_by_key(items, |(key, _)| *key);
        assert_eq!(unique, vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_dedupe_empty() {
        let unique: Vec<u8> = dedupe_by_key(Vec::new(), |v: &u8| *v);
        assert!(unique.is_empty());
    }

    #[test]
    fn test_chunked() {
        assert_eq!(chunked(vec![1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(chunked(vec![1, 2], 0), vec![vec![1], vec![2]]);
        assert!(chunked(Vec::<i32>::new(), 3).is_empty());
    }
}
