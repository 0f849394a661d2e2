//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration and
//! dual (memory + entry count) LRU eviction.

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::lru::eviction_order;
use crate::cache::{CacheAnalytics, CacheEntry, CacheSerializer, CacheStats, JsonSerializer};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache Store ==
/// Bounded key-value storage with per-entry TTL and LRU eviction.
///
/// All methods are synchronous and take `&mut self` where bookkeeping changes;
/// share it across tasks through [`crate::cache::SharedCache`].
#[derive(Debug)]
pub struct CacheStore<S: CacheSerializer = JsonSerializer> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Capacity and TTL settings
    config: CacheConfig,
    /// Value encoding strategy
    serializer: S,
    /// Logical clock stamped on inserts and hits
    access_clock: u64,
}

impl CacheStore<JsonSerializer> {
    // == Constructor ==
    /// Creates a new CacheStore using the JSON serializer.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_serializer(config, JsonSerializer)
    }
}

impl<S: CacheSerializer> CacheStore<S> {
    /// Creates a new CacheStore with a custom serializer.
    pub fn with_serializer(config: CacheConfig, serializer: S) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            config,
            serializer,
            access_clock: 0,
        }
    }

    /// Returns the configuration this store was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Expired entries are removed and counted as misses. A payload that does
    /// not decode as `T` is also reported as a miss but left in place.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if !self.evict_if_expired(key) {
            self.stats.record_miss();
            return None;
        }

        let decoded = match self.entries.get(key) {
            Some(entry) => self.serializer.decode::<T>(&entry.value),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match decoded {
            Ok(value) => {
                let seq = self.tick();
                if let Some(entry) = self.entries.get_mut(key) {
                    entry.record_hit(seq);
                }
                self.stats.record_hit();
                Some(value)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Cached value could not be decoded, treating as miss");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry for the key.
    ///
    /// Uses `default_ttl` when `ttl` is None. A value that cannot be
    /// serialized is skipped with a warning; the store is left unchanged.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) {
        let key = key.into();
        if let Err(err) = self.try_set(key.clone(), value, ttl) {
            warn!(key = %key, error = %err, "Skipping cache write");
        }
    }

    /// Like [`CacheStore::set`] but reports serialization failures.
    pub fn try_set<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = key.into();
        let bytes = self.serializer.encode(value)?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        // Overwrite: drop the old entry first so its size is not counted twice
        self.remove_entry(&key);

        if self.config.max_entries == 0 {
            debug!(key = %key, "Store has no entry capacity, skipping write");
            return Ok(());
        }

        let seq = self.tick();
        let entry = CacheEntry::new(key.clone(), bytes, ttl, seq);
        self.ensure_capacity(entry.size_bytes);

        self.stats.memory_usage += entry.size_bytes;
        self.entries.insert(key, entry);
        self.stats.size = self.entries.len();

        Ok(())
    }

    // == Has ==
    /// Returns true if a live entry exists. Does not touch hit or access metadata.
    pub fn has(&mut self, key: &str) -> bool {
        self.evict_if_expired(key)
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes all entries. Hits and misses are cumulative and survive.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.reset_occupancy();
    }

    // == Invalidate Pattern ==
    /// Removes every key matching `pattern`, returning how many were removed.
    pub fn invalidate_pattern(&mut self, pattern: &Regex) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key);
        }

        debug!(pattern = %pattern, removed = matching.len(), "Invalidated keys by pattern");
        matching.len()
    }

    // == Batch ==
    /// Reads several keys at once with the same semantics as [`CacheStore::get`].
    pub fn get_many<T: DeserializeOwned, K: AsRef<str>>(&mut self, keys: &[K]) -> Vec<Option<T>> {
        keys.iter().map(|key| self.get(key.as_ref())).collect()
    }

    /// Stores several values with a shared TTL, returning how many were written.
    ///
    /// One unserializable value does not stop the rest of the batch.
    pub fn set_many<T, I>(&mut self, entries: I, ttl: Option<Duration>) -> usize
    where
        T: Serialize,
        I: IntoIterator<Item = (String, T)>,
    {
        let mut stored = 0;
        for (key, value) in entries {
            match self.try_set(key.clone(), &value, ttl) {
                Ok(()) => stored += 1,
                Err(err) => warn!(key = %key, error = %err, "Skipping cache write in batch"),
            }
        }
        stored
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.entries.len();
        stats
    }

    /// Returns a detailed analytics snapshot.
    pub fn analytics(&self) -> CacheAnalytics {
        CacheAnalytics::collect(
            self.stats(),
            &self.entries,
            self.config.compression_threshold_bytes,
            current_timestamp_ms(),
        )
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Makes room for an entry of `new_size` bytes.
    ///
    /// Memory pressure first purges expired entries, then evicts in LRU order
    /// until the overflow plus 10% of the budget is freed. Independently, a
    /// full store evicts its oldest ~10% of entries.
    fn ensure_capacity(&mut self, new_size: usize) {
        let max_memory = self.config.max_memory_bytes;

        if self.stats.memory_usage + new_size > max_memory {
            let purged = self.cleanup_expired();
            if purged > 0 {
                debug!(purged, "Purged expired entries under memory pressure");
            }

            if self.stats.memory_usage + new_size > max_memory {
                let overflow = self.stats.memory_usage + new_size - max_memory;
                let target = overflow + max_memory / 10;
                let mut freed = 0;
                let mut evicted = 0;

                for key in eviction_order(&self.entries) {
                    if freed >= target {
                        break;
                    }
                    if let Some(entry) = self.remove_entry(&key) {
                        debug!(key = %key, size = entry.size_bytes, "Evicted entry (memory)");
                        freed += entry.size_bytes;
                        evicted += 1;
                    }
                }

                self.stats.record_evictions(evicted);
            }
        }

        let len = self.entries.len();
        let max_entries = self.config.max_entries;
        if len >= max_entries && len > 0 {
            let tenth = (len + 9) / 10;
            let batch = tenth.max(len + 1 - max_entries.min(len));
            let mut evicted = 0;

            for key in eviction_order(&self.entries).into_iter().take(batch) {
                if self.remove_entry(&key).is_some() {
                    debug!(key = %key, "Evicted entry (count)");
                    evicted += 1;
                }
            }

            self.stats.record_evictions(evicted);
        }
    }

    // == Internal Helpers ==
    /// Removes the entry if expired. Returns true if a live entry remains.
    fn evict_if_expired(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.remove_entry(key);
            debug!(key = %key, "Lazily expired entry");
            return false;
        }
        true
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.stats.memory_usage = self.stats.memory_usage.saturating_sub(entry.size_bytes);
        self.stats.size = self.entries.len();
        Some(entry)
    }

    fn tick(&mut self) -> u64 {
        self.access_clock += 1;
        self.access_clock
    }
}
