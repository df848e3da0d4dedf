//! Cache Store Module
//!
//! The keyed entry map every cache operation works on, plus the set of keys
//! whose refresh is currently in flight. The store itself is not synchronized;
//! [`Cache`](crate::cache::Cache) keeps it behind a single `RwLock`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, Freshness, RefreshFn};

// == Cache Hit ==
/// A live value read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit<V> {
    /// Copy of the stored payload
    pub value: V,
    /// Whether the entry is inside its refresh buffer
    pub is_stale: bool,
}

// == Store ==
/// Key to entry mapping with single-flight refresh markers.
pub(crate) struct Store<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Keys with a refresh callback currently running
    in_flight: HashSet<String>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }
}

impl<V: Clone> Store<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Lookup ==
    /// Returns a copy of the payload if the entry exists and has not expired.
    pub fn lookup(&self, key: &str, now: Instant, refresh_buffer: Duration) -> Option<CacheHit<V>> {
        let entry = self.entries.get(key)?;
        match entry.freshness(now, refresh_buffer) {
            Freshness::Expired => None,
            freshness => Some(CacheHit {
                value: entry.data.clone(),
                is_stale: freshness == Freshness::Stale,
            }),
        }
    }

    // == Insert ==
    /// Stores an entry, fully replacing any previous one under `key`.
    pub fn insert(&mut self, key: String, entry: CacheEntry<V>) {
        self.entries.insert(key, entry);
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Discards every entry.
    ///
    /// In-flight markers survive: a refresh that finishes after a clear finds
    /// its key gone and drops the result.
    pub fn clear(&mut self) {
        self.entries = HashMap::new();
    }

    // == Remove Prefix ==
    /// Removes every key starting with `prefix` and returns how many went.
    ///
    /// An empty prefix matches nothing.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        if prefix.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Remove Expired ==
    /// Removes all entries expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    // == Refreshable Keys ==
    /// Keys that are stale but not expired and carry a refresh callback.
    pub fn refreshable_keys(&self, now: Instant, refresh_buffer: Duration) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.needs_refresh(now, refresh_buffer))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Begin Refresh ==
    /// Marks `key` as refreshing and hands out its callback.
    ///
    /// Returns `None` when the key is absent, has no callback, or already has
    /// a refresh in flight.
    pub fn begin_refresh(&mut self, key: &str) -> Option<RefreshFn<V>> {
        if self.in_flight.contains(key) {
            return None;
        }
        let refresh = self.entries.get(key)?.refresh_fn.clone()?;
        self.in_flight.insert(key.to_string());
        Some(refresh)
    }

    // == Finish Refresh ==
    /// Clears the in-flight marker for `key`.
    pub fn finish_refresh(&mut self, key: &str) {
        self.in_flight.remove(key);
    }

    /// Whether a refresh for `key` is currently running.
    #[cfg(test)]
    pub fn is_refreshing(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }

    // == Apply Refresh ==
    /// Writes refreshed data in place if the key still exists.
    ///
    /// Returns false when the key was removed while the refresh ran.
    pub fn apply_refresh(&mut self, key: &str, data: V, ttl: Duration) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.refresh(data, ttl);
                true
            }
            None => false,
        }
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
