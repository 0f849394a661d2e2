//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds read-only analytics snapshots.

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::CacheEntry;

/// Number of keys reported in [`CacheAnalytics::top_keys`].
pub const TOP_KEYS_LIMIT: usize = 10;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub size: usize,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent, expired or undecodable)
    pub misses: u64,
    /// Number of entries evicted under capacity pressure
    pub evictions: u64,
    /// Approximate bytes held by live and not-yet-swept entries
    pub memory_usage: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Reset Occupancy ==
    /// Resets size, memory and eviction counters; hits and misses are cumulative.
    pub fn reset_occupancy(&mut self) {
        self.size = 0;
        self.memory_usage = 0;
        self.evictions = 0;
    }
}

// == Analytics ==
/// Hit count of a single key, as reported in [`CacheAnalytics::top_keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyHits {
    pub key: String,
    pub hits: u64,
}

/// How soon entries are due to expire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpirationDistribution {
    /// Expired but not yet swept
    pub expired: usize,
    pub under_1m: usize,
    pub under_5m: usize,
    pub under_1h: usize,
    pub over_1h: usize,
}

/// Entry counts by approximate size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SizeDistribution {
    pub under_1kb: usize,
    pub under_10kb: usize,
    pub under_100kb: usize,
    pub over_100kb: usize,
}

/// Point-in-time analytics snapshot for external reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheAnalytics {
    pub stats: CacheStats,
    pub hit_rate: f64,
    /// Most read keys, highest hit count first
    pub top_keys: Vec<KeyHits>,
    pub expiration: ExpirationDistribution,
    pub sizes: SizeDistribution,
    /// Entries at or above the compression threshold (compression is not applied)
    pub compression_candidates: usize,
}

impl CacheAnalytics {
    /// Builds a snapshot from the store's entries at `now_ms`.
    pub fn collect(
        stats: CacheStats,
        entries: &HashMap<String, CacheEntry>,
        compression_threshold: usize,
        now_ms: u64,
    ) -> Self {
        let mut top: Vec<KeyHits> = entries
            .values()
            .map(|entry| KeyHits {
                key: entry.key.clone(),
                hits: entry.hit_count,
            })
            .collect();
        top.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.key.cmp(&b.key)));
        top.truncate(TOP_KEYS_LIMIT);

        let mut expiration = ExpirationDistribution::default();
        let mut sizes = SizeDistribution::default();
        let mut compression_candidates = 0;

        for entry in entries.values() {
            let remaining = entry.expires_at.saturating_sub(now_ms);
            match remaining {
                0 => expiration.expired += 1,
                r if r < 60_000 => expiration.under_1m += 1,
                r if r < 300_000 => expiration.under_5m += 1,
                r if r < 3_600_000 => expiration.under_1h += 1,
                _ => expiration.over_1h += 1,
            }

            match entry.size_bytes {
                s if s < 1024 => sizes.under_1kb += 1,
                s if s < 10 * 1024 => sizes.under_10kb += 1,
                s if s < 100 * 1024 => sizes.under_100kb += 1,
                _ => sizes.over_100kb += 1,
            }

            if entry.size_bytes >= compression_threshold {
                compression_candidates += 1;
            }
        }

        Self {
            hit_rate: stats.hit_rate(),
            stats,
            top_keys: top,
            expiration,
            sizes,
            compression_candidates,
        }
    }
}
