//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with its serialized payload and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key under which the entry is stored
    pub key: String,
    /// Serialized payload
    pub value: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last successful read or write (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Expiration timestamp (Unix milliseconds), always > created_at
    pub expires_at: u64,
    /// Number of reads served by this entry
    pub hit_count: u64,
    /// Approximate footprint: key length plus serialized length
    pub size_bytes: usize,
    /// Logical access clock, breaks ties between equal millisecond timestamps
    pub access_seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// A zero TTL is clamped to one millisecond so `expires_at > created_at`.
    ///
    /// # Arguments
    /// * `key` - The key the entry will be stored under
    /// * `value` - The serialized payload
    /// * `ttl` - Time to live
    /// * `access_seq` - Store-assigned logical clock value
    pub fn new(key: String, value: Vec<u8>, ttl: Duration, access_seq: u64) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = duration_ms(ttl).max(1);
        let size_bytes = key.len() + value.len();

        Self {
            key,
            value,
            created_at: now,
            last_accessed_at: now,
            expires_at: now.saturating_add(ttl_ms),
            hit_count: 0,
            size_bytes,
            access_seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is live while `now < expires_at`; at the boundary it is expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`CacheEntry::is_expired`] against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Record Hit ==
    /// Bumps hit count and access time after a successful read.
    pub fn record_hit(&mut self, access_seq: u64) {
        self.hit_count += 1;
        self.last_accessed_at = current_timestamp_ms();
        self.access_seq = access_seq;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn entry(ttl_ms: u64) -> CacheEntry {
        CacheEntry::new(
            "k".to_string(),
            b"\"v\"".to_vec(),
            Duration::from_millis(ttl_ms),
            0,
        )
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(60_000);

        assert_eq!(entry.value, b"\"v\"".to_vec());
        assert_eq!(entry.hit_count, 0);
        assert_eq!(entry.size_bytes, 4);
        assert_eq!(entry.created_at, entry.last_accessed_at);
        assert!(entry.expires_at > entry.created_at);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_clamped() {
        let entry = entry(0);
        assert_eq!(entry.expires_at, entry.created_at + 1);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = entry(50);
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(60));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_record_hit_updates_metadata() {
        let mut entry = entry(60_000);
        let before = entry.last_accessed_at;

        entry.record_hit(7);
        entry.record_hit(9);

        assert_eq!(entry.hit_count, 2);
        assert_eq!(entry.access_seq, 9);
        assert!(entry.last_accessed_at >= before);
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = entry(10_000);

        let remaining_ms = entry.ttl_remaining_ms();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }

    #[test]
    fn test_huge_ttl_does_not_wrap() {
        let entry = CacheEntry::new(
            "k".to_string(),
            b"1".to_vec(),
            Duration::from_secs(1 << 62),
            0,
        );

        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired());
        assert_eq!(duration_ms(Duration::from_millis(1500)), 1500);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let mut entry = entry(10_000);
        let now = current_timestamp_ms();
        entry.expires_at = now;

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }
}
