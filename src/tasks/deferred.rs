//! Deferred Tasks
//!
//! Spawn-and-detach primitive for fire-and-forget work such as entity
//! population. The work runs on the runtime after the caller's current
//! step returns; dropping the returned handle detaches it.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug_span, warn, Instrument};

/// Spawns `work` on the current tokio runtime under a `deferred` span.
///
/// Outside a runtime the work is dropped with a warning and `None` is
/// returned; the caller never panics.
pub fn spawn_detached<F>(label: &'static str, work: F) -> Option<JoinHandle<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match Handle::try_current() {
        Ok(runtime) => Some(runtime.spawn(work.instrument(debug_span!("deferred", task = label)))),
        Err(err) => {
            warn!(task = label, error = %err, "No tokio runtime, dropping deferred work");
            None
        }
    }
}
