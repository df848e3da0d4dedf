//! Stats Logger Task
//!
//! Purely diagnostic: never touches cache state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns a background task that logs hit rate and entry count every
/// `stats_interval`. Nothing is logged while no reads have happened.
pub(crate) fn spawn_stats_task<V>(shared: Arc<Shared<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let interval = shared.config.stats_interval;
    let shutdown = shared.shutdown.clone();
    let tracker = shared.tracker.clone();

    tracker.spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let stats = *shared.stats.read().await;
            if stats.total_requests() == 0 {
                continue;
            }
            let entries = shared.store.read().await.len();

            info!(
                "Cache Stats - Hits: {}, Misses: {}, Hit Rate: {:.2}%, Refreshes: {}, Entries: {}",
                stats.hits,
                stats.misses,
                stats.hit_rate() * 100.0,
                stats.refreshes,
                entries
            );
        }

        debug!("Stats logger task stopped");
    });
}
