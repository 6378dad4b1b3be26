//! Health check HTTP handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::web::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Domains with a cache entry
    pub domains: usize,
    /// Icons with cached bytes
    pub icons: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        domains: state.icon_store.entry_count(),
        icons: state.icon_store.cached_icon_count(),
    })
}
