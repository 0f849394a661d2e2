//! Entity Index
//!
//! Opportunistically caches individual entities pulled out of larger result
//! sets under identity keys, so a later single-entity lookup can be served
//! without touching the backend. This is a key convention on top of
//! [`SharedCache`], not a separate store.
//!
//! Only complete entities are indexed: every required field must resolve to
//! a non-null value, otherwise the item is skipped.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::batch::{chunked, dedupe_by_key};
use crate::cache::{CacheSerializer, JsonSerializer, SharedCache};
use crate::tasks::spawn_detached;

/// Entities written per lock acquisition.
const ENTITY_WRITE_CHUNK: usize = 64;

// == Keys ==
/// Builds `entity:<type>:<id>[:<id>...]`.
pub fn entity_key(entity_type: &str, ids: &[&str]) -> String {
    let mut key = format!("entity:{entity_type}");
    for id in ids {
        key.push(':');
        key.push_str(id);
    }
    key
}

/// Whether entity keys are shared or namespaced per user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityScope {
    pub user_scoped: bool,
    pub user_id: Option<String>,
}

impl EntityScope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_scoped: true,
            user_id: Some(user_id.into()),
        }
    }

    /// Prepends `user:<id>:` when user scoped and an id is present.
    pub fn key_for(&self, base_key: &str) -> String {
        match (&self.user_id, self.user_scoped) {
            (Some(user_id), true) => format!("user:{user_id}:{base_key}"),
            _ => base_key.to_string(),
        }
    }
}

/// Options for [`EntityIndex::cache_entities`].
#[derive(Debug, Clone, Default)]
pub struct EntityCacheOptions {
    /// Dot paths that must be present and non-null, e.g. `"address.zip"`
    pub required_fields: Vec<String>,
    /// TTL for indexed entities; store default when None
    pub ttl: Option<Duration>,
    pub scope: EntityScope,
}

impl EntityCacheOptions {
    pub fn new<I, S>(required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: required_fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_scope(mut self, scope: EntityScope) -> Self {
        self.scope = scope;
        self
    }
}

// == Required Fields ==
/// Resolves a dot path through nested objects.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// True when every field resolves to a non-null value.
pub fn has_required_fields(value: &Value, fields: &[String]) -> bool {
    fields
        .iter()
        .all(|field| matches!(lookup_path(value, field), Some(v) if !v.is_null()))
}

// == Entity Index ==
/// Secondary, entity-level keyspace over a shared cache.
pub struct EntityIndex<S: CacheSerializer = JsonSerializer> {
    cache: SharedCache<S>,
}

impl<S: CacheSerializer> Clone for EntityIndex<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<S: CacheSerializer> EntityIndex<S> {
    pub fn new(cache: SharedCache<S>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SharedCache<S> {
        &self.cache
    }

    // == Cache Entities ==
    /// Indexes `items` in the background and returns immediately.
    ///
    /// Dropping the returned handle detaches the task; awaiting it yields
    /// the number of entities stored. Failures never reach the caller, and
    /// without a tokio runtime the work is skipped and `None` returned.
    pub fn cache_entities<T, I, F>(
        &self,
        items: I,
        key_extractor: F,
        options: EntityCacheOptions,
    ) -> Option<JoinHandle<usize>>
    where
        T: Serialize + Send + 'static,
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> Option<String> + Send + 'static,
    {
        let items: Vec<T> = items.into_iter().collect();
        let index = self.clone();

        spawn_detached("cache_entities", async move {
            index.populate(items, key_extractor, &options).await
        })
    }

    /// Indexes `items` in place and returns how many entities were stored.
    pub async fn populate<T, I, F>(
        &self,
        items: I,
        key_extractor: F,
        options: &EntityCacheOptions,
    ) -> usize
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> Option<String>,
    {
        let mut candidates: Vec<(String, Value)> = Vec::new();
        let mut skipped = 0usize;

        for item in items {
            let value = match serde_json::to_value(&item) {
                Ok(value) => value,
                Err(err) => {
                    debug!(error = %err, "Skipping entity that could not be serialized");
                    skipped += 1;
                    continue;
                }
            };

            if !has_required_fields(&value, &options.required_fields) {
                skipped += 1;
                continue;
            }

            match key_extractor(&item) {
                Some(base_key) => candidates.push((options.scope.key_for(&base_key), value)),
                None => skipped += 1,
            }
        }

        let candidates = dedupe_by_key(candidates, |(key, _)| key.clone());
        let mut stored = 0;
        for chunk in chunked(candidates, ENTITY_WRITE_CHUNK) {
            stored += self.cache.set_many(chunk, options.ttl).await;
        }

        debug!(stored, skipped, "Entity index populated");
        stored
    }

    // == Get Entity ==
    /// Reads an entity back using the same scoping rule as population.
    pub async fn get_entity<T: DeserializeOwned>(
        &self,
        base_key: &str,
        scope: &EntityScope,
    ) -> Option<T> {
        self.cache.get(&scope.key_for(base_key)).await
    }
}
