//! Proactive Refresh Task
//!
//! Background task that refreshes stale entries before they expire, so
//! callers keep hitting warm data even when nobody reads a key in its
//! refresh window.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns the proactive refresh loop.
///
/// Every `refresh_interval` the task collects, under the store's read lock,
/// the keys that are stale but not yet expired and carry a refresh callback.
/// It then dispatches one independent refresh per key and moves on without
/// awaiting them.
pub(crate) fn spawn_refresh_task<V>(shared: Arc<Shared<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let interval = shared.config.refresh_interval;
    let shutdown = shared.shutdown.clone();
    let tracker = shared.tracker.clone();

    tracker.spawn(async move {
        info!("Starting proactive refresh task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let keys = {
                let store = shared.store.read().await;
                store.refreshable_keys(Instant::now(), shared.config.refresh_buffer)
            };

            if !keys.is_empty() {
                debug!("Proactive refresh: dispatching {} stale keys", keys.len());
            }
            for key in keys {
                shared.spawn_refresh(key);
            }
        }

        debug!("Proactive refresh task stopped");
    });
}
