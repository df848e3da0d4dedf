//! Background Tasks Module
//!
//! Periodic loops that run for the lifetime of a cache instance.
//!
//! # Tasks
//! - TTL Cleanup: removes expired entries
//! - Proactive Refresh: dispatches refreshes for stale entries with a callback
//! - Stats Logger: reports hit rate and entry count
//!
//! Every loop exits once the cache's shutdown token is cancelled.

mod cleanup;
mod refresh;
mod stats;

pub(crate) use cleanup::spawn_cleanup_task;
pub(crate) use refresh::spawn_refresh_task;
pub(crate) use stats::spawn_stats_task;
