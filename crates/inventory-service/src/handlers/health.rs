//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::StorageBackend;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Configured storage backend.
    pub storage: &'static str,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage = match state.config.storage_backend {
        StorageBackend::Rocks => "rocksdb",
        StorageBackend::Memory => "memory",
    };

    Json(HealthResponse {
        status: "ok",
        service: "inventory",
        version: env!("CARGO_PKG_VERSION"),
        storage,
    })
}
