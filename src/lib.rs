//! Warm Cache - An in-memory TTL cache for slow upstreams
//!
//! Memoizes upstream responses with bounded lifetime, serves stale values
//! while refreshing them in the background, and exposes an optional admin
//! HTTP surface for monitoring and invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{refresh_fn, Cache, CacheHit, CacheStats, RefreshFn};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
