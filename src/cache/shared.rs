//! Shared Cache Handle
//!
//! Async, cloneable handle around a [`CacheStore`]. Every operation takes the
//! store's write lock for its whole bookkeeping step, and no lock is held
//! while a caller-supplied fetch future runs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheAnalytics, CacheSerializer, CacheStats, CacheStore, JsonSerializer};
use crate::change::{smart_cache_update, SmartUpdate};
use crate::config::CacheConfig;
use crate::error::Result;

/// Thread-safe, cloneable cache-aside handle.
pub struct SharedCache<S: CacheSerializer = JsonSerializer> {
    inner: Arc<RwLock<CacheStore<S>>>,
}

impl<S: CacheSerializer> Clone for SharedCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedCache<JsonSerializer> {
    /// Builds a JSON-backed store from configuration.
    pub fn from_config(config: CacheConfig) -> Self {
        Self::new(CacheStore::new(config))
    }
}

impl<S: CacheSerializer> SharedCache<S> {
    // == Constructor ==
    /// Wraps an existing store for shared async access.
    pub fn new(store: CacheStore<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // == Reads and Writes ==
    /// Async form of [`CacheStore::get`]; takes the write lock to record the hit.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.inner.write().await.get(key)
    }

    /// Async form of [`CacheStore::set`]. Serialization failures are logged, not returned.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        self.inner.write().await.set(key, value, ttl);
    }

    /// Like [`SharedCache::set`] but reports serialization failures.
    pub async fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.inner.write().await.try_set(key, value, ttl)
    }

    /// Writes several entries under a single lock acquisition.
    pub async fn set_many<T: Serialize>(
        &self,
        entries: Vec<(String, T)>,
        ttl: Option<Duration>,
    ) -> usize {
        self.inner.write().await.set_many(entries, ttl)
    }

    /// Returns true if a live entry exists, without counting a hit.
    pub async fn has(&self, key: &str) -> bool {
        self.inner.write().await.has(key)
    }

    /// Removes an entry, returning whether anything was removed.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    // == Invalidation ==
    /// Removes all entries; hit and miss counters survive.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Removes every key matching `pattern`, returning how many were removed.
    pub async fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        self.inner.write().await.invalidate_pattern(pattern)
    }

    /// Compiles `pattern` and invalidates matching keys.
    pub async fn invalidate_matching(&self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern)?;
        Ok(self.invalidate_pattern(&regex).await)
    }

    /// Sweeps expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    // == Reporting ==
    /// Returns a snapshot of the store counters.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// Returns a detailed analytics snapshot.
    pub async fn analytics(&self) -> CacheAnalytics {
        self.inner.read().await.analytics()
    }

    /// Number of entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Concurrent misses on the same key each run their own `fetch`; the last
    /// write wins and every caller gets the value it fetched. Fetch errors
    /// propagate unchanged and are never cached.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key).await {
            return Ok(value);
        }

        debug!(key = %key, "Cache miss, fetching");
        let value = fetch().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    // == Smart Update ==
    /// Always fetches, but only rewrites the entry when the fresh value differs.
    pub async fn smart_update<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<SmartUpdate<T>, E>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let reader = self.clone();
        let writer = self.clone();
        smart_cache_update(
            key,
            || async move { reader.get::<T>(key).await },
            fetch,
            |value: T| async move { writer.set(key, &value, ttl).await },
        )
        .await
    }
}
