//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and
//! refresh-callback metadata.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::RefreshFn;

/// Lifetime granted when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Computes `now + ttl`, capping TTLs the clock cannot represent.
fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// == Freshness ==
/// Where an entry sits in its lifetime relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `now < expires_at - refresh_buffer`
    Fresh,
    /// `expires_at - refresh_buffer <= now < expires_at`
    Stale,
    /// `now >= expires_at`
    Expired,
}

// == Cache Entry ==
/// Represents a single cache entry with payload and timing metadata.
pub struct CacheEntry<V> {
    /// The stored payload
    pub data: V,
    /// Instant at which the entry stops being served
    pub expires_at: Instant,
    /// Instant of the most recent successful write
    pub last_refresh_at: Instant,
    /// Callback used to refresh the payload in the background
    pub refresh_fn: Option<RefreshFn<V>>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry written now, expiring after `ttl`.
    pub fn new(data: V, ttl: Duration, refresh_fn: Option<RefreshFn<V>>) -> Self {
        let now = Instant::now();
        Self {
            data,
            expires_at: deadline(now, ttl),
            last_refresh_at: now,
            refresh_fn,
        }
    }

    // == Freshness ==
    /// Classifies the entry at `now`.
    ///
    /// Boundary conditions: an entry is expired once `now` reaches
    /// `expires_at`, and stale once `now` reaches `expires_at - refresh_buffer`.
    /// A buffer reaching back past the clock's origin makes the entry stale
    /// for its whole lifetime.
    pub fn freshness(&self, now: Instant, refresh_buffer: Duration) -> Freshness {
        if now >= self.expires_at {
            Freshness::Expired
        } else if self
            .expires_at
            .checked_sub(refresh_buffer)
            .map_or(true, |stale_at| now >= stale_at)
        {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// True when the proactive loop should pick this entry up.
    pub fn needs_refresh(&self, now: Instant, refresh_buffer: Duration) -> bool {
        self.refresh_fn.is_some() && self.freshness(now, refresh_buffer) == Freshness::Stale
    }

    // == Refresh ==
    /// Replaces the payload in place and restarts the lifetime with `ttl`.
    pub fn refresh(&mut self, data: V, ttl: Duration) {
        let now = Instant::now();
        self.data = data;
        self.expires_at = deadline(now, ttl);
        self.last_refresh_at = now;
    }

}

impl<V: fmt::Debug> fmt::Debug for CacheEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("data", &self.data)
            .field("expires_at", &self.expires_at)
            .field("last_refresh_at", &self.last_refresh_at)
            .field("has_refresh_fn", &self.refresh_fn.is_some())
            .finish()
    }
}
