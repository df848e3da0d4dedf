//! Configuration Module
//!
//! Handles loading server configuration from environment variables and
//! turning it into the tuning parameters the cache runs with.

use std::env;
use std::time::Duration;

// == Cache Config ==
/// Tuning parameters for a [`Cache`](crate::cache::Cache) instance.
///
/// `default_ttl` and `refresh_buffer` define the freshness window of every
/// entry; the remaining fields pace the background loops.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for entries written without an explicit TTL, re-applied on every refresh
    pub default_ttl: Duration,
    /// Window before expiry during which an entry reads as stale
    pub refresh_buffer: Duration,
    /// Period of the expired-entry sweep
    pub cleanup_interval: Duration,
    /// Period of the proactive refresh sweep
    pub refresh_interval: Duration,
    /// Period of the stats log line
    pub stats_interval: Duration,
    /// Upper bound on a single refresh callback
    pub refresh_timeout: Duration,
    /// Maximum number of refresh callbacks running at once
    pub max_concurrent_refreshes: usize,
    /// How long `stop()` waits for background work to drain
    pub shutdown_grace: Duration,
}

impl CacheConfig {
    /// Creates a config with the given freshness window and default pacing.
    pub fn new(default_ttl: Duration, refresh_buffer: Duration) -> Self {
        Self {
            default_ttl,
            refresh_buffer,
            cleanup_interval: Duration::from_secs(60),
            refresh_interval: Duration::from_secs(10),
            stats_interval: Duration::from_secs(300),
            refresh_timeout: Duration::from_secs(10),
            max_concurrent_refreshes: 16,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(15))
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Durations are expressed in whole seconds.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds
    pub default_ttl: u64,
    /// Refresh buffer in seconds
    pub refresh_buffer: u64,
    /// Cleanup sweep interval in seconds
    pub cleanup_interval: u64,
    /// Proactive refresh sweep interval in seconds
    pub refresh_interval: u64,
    /// Stats logging interval in seconds
    pub stats_interval: u64,
    /// Refresh callback timeout in seconds
    pub refresh_timeout: u64,
    /// Refresh concurrency limit
    pub max_concurrent_refreshes: usize,
    /// Shutdown drain timeout in seconds
    pub shutdown_grace: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DEFAULT_TTL_SECONDS` - Default TTL (default: 60)
    /// - `CACHE_REFRESH_BUFFER_SECONDS` - Staleness window before expiry (default: 15)
    /// - `CACHE_CLEANUP_INTERVAL_SECONDS` - Expired-entry sweep period (default: 60)
    /// - `CACHE_REFRESH_INTERVAL_SECONDS` - Proactive refresh period (default: 10)
    /// - `CACHE_STATS_INTERVAL_SECONDS` - Stats log period (default: 300)
    /// - `CACHE_REFRESH_TIMEOUT_SECONDS` - Per-refresh timeout (default: 10)
    /// - `CACHE_MAX_CONCURRENT_REFRESHES` - Refresh concurrency limit (default: 16)
    /// - `CACHE_SHUTDOWN_GRACE_SECONDS` - Shutdown drain timeout (default: 5)
    ///
    /// Values that fail to parse, or are zero where zero makes no sense, fall
    /// back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl: env_positive("CACHE_DEFAULT_TTL_SECONDS").unwrap_or(defaults.default_ttl),
            refresh_buffer: env_parse("CACHE_REFRESH_BUFFER_SECONDS")
                .unwrap_or(defaults.refresh_buffer),
            cleanup_interval: env_positive("CACHE_CLEANUP_INTERVAL_SECONDS")
                .unwrap_or(defaults.cleanup_interval),
            refresh_interval: env_positive("CACHE_REFRESH_INTERVAL_SECONDS")
                .unwrap_or(defaults.refresh_interval),
            stats_interval: env_positive("CACHE_STATS_INTERVAL_SECONDS")
                .unwrap_or(defaults.stats_interval),
            refresh_timeout: env_positive("CACHE_REFRESH_TIMEOUT_SECONDS")
                .unwrap_or(defaults.refresh_timeout),
            max_concurrent_refreshes: env_positive("CACHE_MAX_CONCURRENT_REFRESHES")
                .unwrap_or(defaults.max_concurrent_refreshes),
            shutdown_grace: env_parse("CACHE_SHUTDOWN_GRACE_SECONDS")
                .unwrap_or(defaults.shutdown_grace),
        }
    }

    /// Builds the cache tuning parameters from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(self.default_ttl),
            refresh_buffer: Duration::from_secs(self.refresh_buffer),
            cleanup_interval: Duration::from_secs(self.cleanup_interval),
            refresh_interval: Duration::from_secs(self.refresh_interval),
            stats_interval: Duration::from_secs(self.stats_interval),
            refresh_timeout: Duration::from_secs(self.refresh_timeout),
            max_concurrent_refreshes: self.max_concurrent_refreshes,
            shutdown_grace: Duration::from_secs(self.shutdown_grace),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl: 60,
            refresh_buffer: 15,
            cleanup_interval: 60,
            refresh_interval: 10,
            stats_interval: 300,
            refresh_timeout: 10,
            max_concurrent_refreshes: 16,
            shutdown_grace: 5,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_positive<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    env_parse(name).filter(|v: &T| *v > T::default())
}
