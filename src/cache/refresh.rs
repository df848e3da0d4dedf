//! Refresh Execution
//!
//! Callback types for upstream refreshes and the single-flight refresh of one
//! key, shared by the stale-read path and the proactive refresh loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::Shared;

/// Boxed future returned by a [`RefreshFn`].
pub type RefreshFuture<V> = Pin<Box<dyn Future<Output = anyhow::Result<V>> + Send>>;

/// Upstream refresh callback.
///
/// The token is cancelled when the attempt exceeds the configured refresh
/// timeout; long-running callbacks should watch it.
pub type RefreshFn<V> = Arc<dyn Fn(CancellationToken) -> RefreshFuture<V> + Send + Sync>;

/// Wraps an async closure into a [`RefreshFn`].
///
/// ```ignore
/// let refresh = refresh_fn(|token| async move {
///     tokio::select! {
///         _ = token.cancelled() => anyhow::bail!("cancelled"),
///         account = client.fetch_account() => account,
///     }
/// });
/// ```
pub fn refresh_fn<V, F, Fut>(f: F) -> RefreshFn<V>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    Arc::new(move |token| Box::pin(f(token)))
}

// == Refresh Outcome ==
/// How a single refresh attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
    /// Key absent, without callback, or already refreshing
    Skipped,
    /// New data written (or dropped because the key vanished meanwhile)
    Refreshed,
    /// Callback returned an error or panicked
    Failed,
    /// Callback exceeded the refresh timeout
    TimedOut,
}

impl<V> Shared<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Dispatches a tracked, unawaited refresh of `key`.
    pub(crate) fn spawn_refresh(self: &Arc<Self>, key: String) {
        let shared = Arc::clone(self);
        self.tracker.spawn(async move {
            shared.refresh_key(&key).await;
        });
    }

    /// Refreshes one key through its registered callback.
    ///
    /// Failures leave the existing entry untouched so stale data keeps being
    /// served. A successful refresh re-applies the cache's default TTL.
    pub(crate) async fn refresh_key(&self, key: &str) -> RefreshOutcome {
        let refresh = {
            let mut store = self.store.write().await;
            match store.begin_refresh(key) {
                Some(refresh) => refresh,
                None => return RefreshOutcome::Skipped,
            }
        };

        let result = self.run_refresh(key, refresh).await;

        let mut store = self.store.write().await;
        store.finish_refresh(key);

        match result {
            Ok(data) => {
                if !store.apply_refresh(key, data, self.config.default_ttl) {
                    debug!("Refreshed key {} was removed before the result landed", key);
                }
                drop(store);
                self.stats.write().await.record_refresh();
                debug!("Refreshed cache key {}", key);
                RefreshOutcome::Refreshed
            }
            Err(outcome) => outcome,
        }
    }

    /// Runs the callback on its own task, bounded by the refresh timeout and
    /// the concurrency limit.
    async fn run_refresh(
        &self,
        key: &str,
        refresh: RefreshFn<V>,
    ) -> std::result::Result<V, RefreshOutcome> {
        let Ok(_permit) = self.refresh_permits.acquire().await else {
            return Err(RefreshOutcome::Skipped);
        };

        let token = CancellationToken::new();
        // Invoked on the spawned task so a panic while building the future
        // lands in the JoinError arm below.
        let upstream_token = token.clone();
        let mut upstream = tokio::spawn(async move { refresh(upstream_token).await });

        match tokio::time::timeout(self.config.refresh_timeout, &mut upstream).await {
            Ok(Ok(Ok(data))) => Ok(data),
            Ok(Ok(Err(err))) => {
                warn!("Cache refresh failed for key {}: {:#}", key, err);
                Err(RefreshOutcome::Failed)
            }
            Ok(Err(join_err)) => {
                warn!("Cache refresh task for key {} panicked: {}", key, join_err);
                Err(RefreshOutcome::Failed)
            }
            Err(_) => {
                token.cancel();
                upstream.abort();
                warn!(
                    "Cache refresh for key {} timed out after {:?}",
                    key, self.config.refresh_timeout
                );
                Err(RefreshOutcome::TimedOut)
            }
        }
    }
}
