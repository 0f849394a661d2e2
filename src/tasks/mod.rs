//! Background Tasks Module
//!
//! Contains tasks that run independently of individual cache calls.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Deferred: Fire-and-forget work such as entity index population

mod cleanup;
mod deferred;

pub use cleanup::{spawn_cleanup_task, CleanupHandle, MIN_CLEANUP_INTERVAL};
pub use deferred::spawn_detached;
