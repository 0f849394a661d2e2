//! Change Detection
//!
//! Deep structural comparison used to skip redundant cache writes and to
//! classify keyed collections into added/changed/removed/unchanged.
//!
//! Comparisons recurse without cycle detection; values must be trees.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use serde::Serialize;
use serde_json::{Map, Value};

// == Has Changed ==
/// Returns true unless both sides are present and deeply equal.
///
/// A missing side only counts as unchanged when the other side is missing too.
pub fn has_changed<T: PartialEq + ?Sized>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a != b,
        (None, None) => false,
        _ => true,
    }
}

// == Field-Level Changes ==
/// Outcome of [`detect_changes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub has_changed: bool,
    /// Dot paths of differing leaves; `None` when nothing changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<Vec<String>>,
}

/// Compares two JSON trees and lists the dot paths that differ.
///
/// Objects present on both sides are walked key by key (union of keys);
/// anything else, arrays included, is compared as a whole leaf. When the
/// roots are not both objects the report is changed with no field list
/// entries.
pub fn detect_changes(a: &Value, b: &Value) -> ChangeReport {
    if a == b {
        return ChangeReport {
            has_changed: false,
            changed_fields: None,
        };
    }

    let mut fields = Vec::new();
    if let (Value::Object(a), Value::Object(b)) = (a, b) {
        collect_changed_paths(a, b, "", &mut fields);
    }

    ChangeReport {
        has_changed: true,
        changed_fields: Some(fields),
    }
}

fn collect_changed_paths(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<String>,
) {
    let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match (a.get(key), b.get(key)) {
            (Some(Value::Object(left)), Some(Value::Object(right))) => {
                collect_changed_paths(left, right, &path, out);
            }
            (left, right) => {
                if left != right {
                    out.push(path);
                }
            }
        }
    }
}

// == Batch Changes ==
/// Classification of a fresh collection against cached items keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchChanges<T> {
    pub added: Vec<T>,
    /// Ids cached but absent from the fresh list, sorted
    pub removed: Vec<String>,
    pub changed: Vec<T>,
    pub unchanged: Vec<T>,
}

impl<T> BatchChanges<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Diffs `fresh` against `cached_by_id` using `id_of` as the identity.
pub fn detect_batch_changes<T, F>(
    cached_by_id: &HashMap<String, T>,
    fresh: Vec<T>,
    id_of: F,
) -> BatchChanges<T>
where
    T: PartialEq,
    F: Fn(&T) -> String,
{
    let mut changes = BatchChanges {
        added: Vec::new(),
        removed: Vec::new(),
        changed: Vec::new(),
        unchanged: Vec::new(),
    };
    let mut fresh_ids = HashSet::with_capacity(fresh.len());

    for item in fresh {
        let id = id_of(&item);
        match cached_by_id.get(&id) {
            None => changes.added.push(item),
            Some(cached) if has_changed(Some(cached), Some(&item)) => changes.changed.push(item),
            Some(_) => changes.unchanged.push(item),
        }
        fresh_ids.insert(id);
    }

    changes.removed = cached_by_id
        .keys()
        .filter(|id| !fresh_ids.contains(*id))
        .cloned()
        .collect();
    changes.removed.sort();

    changes
}

// == Smart Cache Update ==
/// Result of [`smart_cache_update`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartUpdate<T> {
    pub data: T,
    pub from_cache: bool,
    pub changed: bool,
}

/// Fetches fresh data and writes it to the cache only when it differs.
///
/// The fetch always runs; what is saved is the write. With no cached value
/// the fresh one is stored. A fetch error propagates and nothing is written.
pub async fn smart_cache_update<T, E, GC, GCFut, GF, GFFut, SC, SCFut>(
    key: &str,
    get_cached: GC,
    get_fresh: GF,
    set_cache: SC,
) -> Result<SmartUpdate<T>, E>
where
    T: PartialEq + Clone,
    GC: FnOnce() -> GCFut,
    GCFut: Future<Output = Option<T>>,
    GF: FnOnce() -> GFFut,
    GFFut: Future<Output = Result<T, E>>,
    SC: FnOnce(T) -> SCFut,
    SCFut: Future<Output = ()>,
{
    let cached = get_cached().await;
    let fresh = get_fresh().await?;

    match cached {
        Some(cached) if !has_changed(Some(&cached), Some(&fresh)) => {
            tracing::debug!(key = %key, "Fresh value unchanged, keeping cached entry");
            Ok(SmartUpdate {
                data: cached,
                from_cache: true,
                changed: false,
            })
        }
        _ => {
            set_cache(fresh.clone()).await;
            Ok(SmartUpdate {
                data: fresh,
                from_cache: false,
                changed: true,
            })
        }
    }
}
