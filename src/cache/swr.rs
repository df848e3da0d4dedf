//! Stale-While-Revalidate Cache
//!
//! The public cache handle: read/write operations over the store, read-through
//! helpers that serve stale data while refreshing in the background, and the
//! lifecycle of the background loops.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheHit, CacheStats, RefreshFn, Store};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_cleanup_task, spawn_refresh_task, spawn_stats_task};

/// State shared between the cache handle and its background tasks.
pub(crate) struct Shared<V> {
    pub(crate) store: RwLock<Store<V>>,
    /// Locked independently so reads never queue behind stats bookkeeping.
    pub(crate) stats: RwLock<CacheStats>,
    pub(crate) config: CacheConfig,
    pub(crate) refresh_permits: Semaphore,
    pub(crate) tracker: TaskTracker,
    pub(crate) shutdown: CancellationToken,
}

// == Cache ==
/// Concurrent TTL cache with stale-while-revalidate refresh.
///
/// Construct one instance and share it behind an `Arc`. Dropping the last
/// handle signals the background loops to exit; [`Cache::stop`] does the same
/// and additionally waits for outstanding work.
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
    stopped: AtomicBool,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its cleanup, proactive refresh and stats
    /// logging loops.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        let shared = Arc::new(Shared {
            store: RwLock::new(Store::new()),
            stats: RwLock::new(CacheStats::new()),
            refresh_permits: Semaphore::new(config.max_concurrent_refreshes.max(1)),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            config,
        });

        spawn_cleanup_task(Arc::clone(&shared));
        spawn_refresh_task(Arc::clone(&shared));
        spawn_stats_task(Arc::clone(&shared));

        info!(
            "Cache started: default_ttl={:?}, refresh_buffer={:?}",
            shared.config.default_ttl, shared.config.refresh_buffer
        );

        Self {
            shared,
            stopped: AtomicBool::new(false),
        }
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Returns `None` for absent or expired keys. Every call records exactly
    /// one hit or miss.
    pub async fn get(&self, key: &str) -> Option<CacheHit<V>> {
        let now = Instant::now();
        let hit = {
            let store = self.shared.store.read().await;
            store.lookup(key, now, self.shared.config.refresh_buffer)
        };

        let mut stats = self.shared.stats.write().await;
        match hit {
            Some(_) => stats.record_hit(),
            None => stats.record_miss(),
        }
        hit
    }

    // == Set ==
    /// Stores a value with the default TTL and no refresh callback.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let ttl = self.shared.config.default_ttl;
        self.set_with_ttl(key, value, ttl, None).await;
    }

    /// Stores a value with an explicit TTL and optional refresh callback,
    /// fully replacing any previous entry.
    pub async fn set_with_ttl(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        refresh_fn: Option<RefreshFn<V>>,
    ) {
        let entry = CacheEntry::new(value, ttl, refresh_fn);
        self.shared.store.write().await.insert(key.into(), entry);
    }

    /// Stores a value and registers the callback used to refresh it.
    pub async fn set_with_refresh(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        refresh_fn: RefreshFn<V>,
    ) {
        self.set_with_ttl(key, value, ttl, Some(refresh_fn)).await;
    }

    // == Get Or Set ==
    /// Returns the cached value, fetching and storing it on a miss.
    ///
    /// A stale hit is returned as-is while a background refresh is
    /// dispatched. A failed fetch is returned to the caller and nothing is
    /// cached.
    pub async fn get_or_set<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        if let Some(value) = self.serve_cached(key).await {
            return Ok(value);
        }

        let data = fetch().await.map_err(CacheError::Fetch)?;
        self.set_with_ttl(key, data.clone(), ttl, None).await;
        Ok(data)
    }

    /// Like [`Cache::get_or_set`], but the miss path calls `refresh_fn` and
    /// registers it on the stored entry for later background refreshes.
    pub async fn get_or_set_with_refresh(
        &self,
        key: &str,
        ttl: Duration,
        refresh_fn: RefreshFn<V>,
    ) -> Result<V> {
        if let Some(value) = self.serve_cached(key).await {
            return Ok(value);
        }

        let data = refresh_fn(CancellationToken::new())
            .await
            .map_err(CacheError::Fetch)?;
        self.set_with_refresh(key, data.clone(), ttl, refresh_fn).await;
        Ok(data)
    }

    async fn serve_cached(&self, key: &str) -> Option<V> {
        let hit = self.get(key).await?;
        if hit.is_stale {
            debug!("Serving stale value for key {}, refreshing in background", key);
            self.shared.spawn_refresh(key.to_string());
        }
        Some(hit.value)
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if the key was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.shared.store.write().await.remove(key)
    }

    // == Clear ==
    /// Discards every entry.
    pub async fn clear(&self) {
        self.shared.store.write().await.clear();
    }

    // == Invalidate Prefix ==
    /// Removes every key that starts with the literal `prefix`.
    ///
    /// Returns the number of keys removed. An empty prefix removes nothing.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = self.shared.store.write().await.remove_prefix(prefix);
        debug!("Invalidated {} keys with prefix {:?}", removed, prefix);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the hit/miss/refresh counters.
    pub async fn stats(&self) -> CacheStats {
        *self.shared.stats.read().await
    }

    /// Returns the number of stored entries, expired-but-unswept included.
    pub async fn len(&self) -> usize {
        self.shared.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.shared.store.read().await.is_empty()
    }

    // == Stop ==
    /// Stops the background loops and waits, up to the configured grace
    /// period, for them and any in-flight refreshes to finish.
    ///
    /// Stopping is one-shot: a second call returns
    /// [`CacheError::AlreadyStopped`].
    pub async fn stop(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(CacheError::AlreadyStopped);
        }

        info!("Stopping cache background tasks");
        self.shared.shutdown.cancel();
        self.shared.tracker.close();

        let grace = self.shared.config.shutdown_grace;
        if tokio::time::timeout(grace, self.shared.tracker.wait())
            .await
            .is_err()
        {
            warn!(
                "Cache stop timed out after {:?} with {} background tasks still running",
                grace,
                self.shared.tracker.len()
            );
        }
        Ok(())
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}
