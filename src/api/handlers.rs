//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, InvalidateResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache is constructed once and injected here; handlers never reach for
/// a global instance.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache of JSON payloads
    pub cache: Arc<Cache<Value>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Arc<Cache<Value>>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh cache built from `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: CacheConfig) -> Self {
        Self::new(Arc::new(Cache::new(config)))
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value, with the default TTL unless `ttl` is given.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    match req.ttl {
        Some(ttl) => {
            state
                .cache
                .set_with_ttl(req.key.clone(), req.value, Duration::from_secs(ttl), None)
                .await
        }
        None => state.cache.set(req.key.clone(), req.value).await,
    }

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key, flagging stale entries.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let hit = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, hit.value, hit.is_stale)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /invalidate/:prefix
///
/// Removes every key starting with the literal prefix. Matching nothing is
/// not an error.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.invalidate_prefix(&prefix).await;
    Json(InvalidateResponse::new(prefix, removed))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let total_entries = state.cache.len().await;

    Json(StatsResponse::new(stats, total_entries))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
