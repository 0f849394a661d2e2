//! API Handlers
//!
//! HTTP request handlers for each cache administration endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheAnalytics, SharedCache};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fingerprint::build_fingerprint;
use crate::models::{
    DeleteResponse, FingerprintRequest, FingerprintResponse, GetResponse, HealthResponse,
    InvalidateRequest, InvalidateResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
}

impl AppState {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh store built from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(SharedCache::from_config(config.clone()))
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl_ms.map(Duration::from_millis);
    state.cache.try_set(&req.key, &req.value, ttl).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value: Value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
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

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /analytics
pub async fn analytics_handler(State(state): State<AppState>) -> Json<CacheAnalytics> {
    Json(state.cache.analytics().await)
}

/// Handler for POST /invalidate
///
/// Removes every key matching the given regular expression.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.cache.invalidate_matching(&req.pattern).await?;

    Ok(Json(InvalidateResponse {
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for POST /fingerprint
///
/// Computes the cache key a query handler would use for the given request.
pub async fn fingerprint_handler(
    Json(req): Json<FingerprintRequest>,
) -> Result<Json<FingerprintResponse>> {
    if req.operation.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Operation cannot be empty".to_string(),
        ));
    }

    let key = build_fingerprint(&req.operation, &req.variables, &req.options);
    Ok(Json(FingerprintResponse { key }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
