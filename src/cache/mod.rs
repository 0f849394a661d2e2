//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and memory/count bounded
//! LRU eviction.

mod entry;
mod lru;
mod serializer;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, duration_ms, CacheEntry};
pub use lru::{eviction_order, RecencyKey};
pub use serializer::{CacheSerializer, JsonSerializer};
pub use shared::SharedCache;
pub use stats::{
    CacheAnalytics, CacheStats, ExpirationDistribution, KeyHits, SizeDistribution, TOP_KEYS_LIMIT,
};
pub use store::CacheStore;
