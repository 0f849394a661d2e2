//! Query Cache - an application-level cache for expensive query results
//!
//! Provides deterministic query fingerprints, a TTL + LRU store bounded by
//! entry count and memory, an entity index filled from list results, and
//! change detection for skipping redundant writes.

pub mod api;
pub mod batch;
pub mod cache;
pub mod change;
pub mod config;
pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheAnalytics, CacheStats, CacheStore, JsonSerializer, SharedCache};
pub use change::{detect_batch_changes, detect_changes, has_changed, BatchChanges, SmartUpdate};
pub use config::{CacheConfig, Config};
pub use entity::{entity_key, EntityCacheOptions, EntityIndex, EntityScope};
pub use error::{CacheError, Result};
pub use fingerprint::{build_fingerprint, FingerprintBuilder, FingerprintOptions, TimeBucket};
pub use tasks::{spawn_cleanup_task, CleanupHandle};
