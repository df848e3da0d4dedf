//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// Every `cleanup_interval` the task takes the store's write lock once and
/// drops every entry whose expiry has passed. It runs until the cache's
/// shutdown token is cancelled.
pub(crate) fn spawn_cleanup_task<V>(shared: Arc<Shared<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let interval = shared.config.cleanup_interval;
    let shutdown = shared.shutdown.clone();
    let tracker = shared.tracker.clone();

    tracker.spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            // Acquire write lock and cleanup expired entries
            let removed = {
                let mut store = shared.store.write().await;
                store.remove_expired(Instant::now())
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }

        debug!("TTL cleanup task stopped");
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::cache::Cache;
    use crate::config::CacheConfig;

    fn config(cleanup_interval: Duration) -> CacheConfig {
        let mut config = CacheConfig::new(Duration::from_secs(60), Duration::from_secs(1));
        config.cleanup_interval = cleanup_interval;
        config
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Cache::new(config(Duration::from_millis(50)));

        cache
            .set_with_ttl("expire_soon", "value".to_string(), Duration::from_millis(20), None)
            .await;
        assert_eq!(cache.len().await, 1);

        // Wait for entry to expire and cleanup to run
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.len().await, 0, "Expired entry should have been cleaned up");
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Cache::new(config(Duration::from_millis(50)));

        cache
            .set_with_ttl("long_lived", "value".to_string(), Duration::from_secs(3600), None)
            .await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        let hit = cache.get("long_lived").await;
        assert_eq!(hit.map(|h| h.value).as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let cache: Cache<String> = Cache::new(config(Duration::from_millis(50)));

        cache
            .set_with_ttl("expire_soon", "value".to_string(), Duration::from_millis(20), None)
            .await;
        cache.stop().await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        // No sweep after stop: the expired entry is still physically stored.
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("expire_soon").await.is_none());
    }
}
