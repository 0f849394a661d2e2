//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::duration_ms;

/// Plain-value settings consumed by [`crate::cache::CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Approximate memory budget in bytes
    pub max_memory_bytes: usize,
    /// TTL for entries stored without an explicit one
    pub default_ttl: Duration,
    /// Interval between background expiry sweeps
    pub cleanup_interval: Duration,
    /// Entries at or above this size are reported as compression candidates
    pub compression_threshold_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_memory_bytes: 100 * 1024 * 1024,
            default_ttl: Duration::from_millis(300_000),
            cleanup_interval: Duration::from_millis(60_000),
            compression_threshold_bytes: 1024,
        }
    }
}

impl CacheConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache store settings
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_MEMORY_BYTES` - Memory budget in bytes (default: 100 MiB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    /// - `COMPRESSION_THRESHOLD_BYTES` - Compression reporting threshold (default: 1024)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = CacheConfig::default();
        Self {
            cache: CacheConfig {
                max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
                max_memory_bytes: env_or("MAX_MEMORY_BYTES", defaults.max_memory_bytes),
                default_ttl: Duration::from_millis(env_or(
                    "DEFAULT_TTL_MS",
                    duration_ms(defaults.default_ttl),
                )),
                cleanup_interval: non_zero_interval(
                    env_or("CLEANUP_INTERVAL_MS", duration_ms(defaults.cleanup_interval)),
                    defaults.cleanup_interval,
                ),
                compression_threshold_bytes: env_or(
                    "COMPRESSION_THRESHOLD_BYTES",
                    defaults.compression_threshold_bytes,
                ),
            },
            server_port: env_or("SERVER_PORT", 3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
        }
    }
}

/// A zero sweep interval would spin on the store lock; fall back to `default`.
fn non_zero_interval(ms: u64, default: Duration) -> Duration {
    if ms == 0 {
        warn!(default_ms = duration_ms(default), "CLEANUP_INTERVAL_MS must be > 0, using default");
        return default;
    }
    Duration::from_millis(ms)
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
