//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, and background refreshes.

use serde::Serialize;

// == Cache Stats ==
/// Monotonic counters scoped to a cache instance's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing (absent or expired)
    pub misses: u64,
    /// Number of successful background refreshes
    pub refreshes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Number of reads served, hits and misses together.
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Refresh ==
    /// Increments the refresh counter.
    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }
}
