//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{duration_ms, CacheSerializer, SharedCache};

/// Shortest accepted pause between sweeps.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(10);

/// Owns the sweep task. Stopping or dropping the handle aborts the task, so
/// the timer never outlives its owner.
#[derive(Debug)]
pub struct CleanupHandle {
    handle: JoinHandle<()>,
}

impl CleanupHandle {
    /// Aborts the sweep. Safe to call more than once.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between runs and takes the store's write
/// lock only for the duration of each sweep. Intervals shorter than
/// [`MIN_CLEANUP_INTERVAL`] are raised to it.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::from_config(CacheConfig::default());
/// let cleanup = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup.stop();
/// ```
pub fn spawn_cleanup_task<S: CacheSerializer>(
    cache: SharedCache<S>,
    interval: Duration,
) -> CleanupHandle {
    let interval = effective_interval(interval);
    let handle = tokio::spawn(async move {
        info!(interval_ms = duration_ms(interval), "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    });

    CleanupHandle { handle }
}

fn effective_interval(requested: Duration) -> Duration {
    if requested < MIN_CLEANUP_INTERVAL {
        warn!(
            requested_ms = duration_ms(requested),
            min_ms = duration_ms(MIN_CLEANUP_INTERVAL),
            "Cleanup interval too short, raising to minimum"
        );
        return MIN_CLEANUP_INTERVAL;
    }
    requested
}
