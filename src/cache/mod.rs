//! Cache Module
//!
//! Provides the in-memory TTL cache with stale-while-revalidate refresh.

mod entry;
mod refresh;
mod stats;
mod store;
mod swr;


// Re-export public types
pub use entry::{CacheEntry, Freshness};
pub use refresh::{refresh_fn, RefreshFn, RefreshFuture};
pub use stats::CacheStats;
pub use store::CacheHit;
pub use swr::Cache;

#[cfg(test)]
pub(crate) use refresh::RefreshOutcome;
pub(crate) use store::Store;
pub(crate) use swr::Shared;
