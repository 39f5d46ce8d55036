//! Health and readiness handlers.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use bundle_store::CacheStats;

use crate::config::DeployMode;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub data_root: String,
    pub data_root_present: bool,
    pub mode: DeployMode,
    pub cache: CacheStats,
    pub store_reads: u64,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check (verifies the data root is mounted)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let root = &state.config.data_root;
    let present = tokio::fs::metadata(root)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    let response = ReadyResponse {
        ready: present,
        data_root: root.display().to_string(),
        data_root_present: present,
        mode: state.config.mode,
        cache: state.resolver.cache().stats().await,
        store_reads: state.store.reads(),
    };

    let status = if present {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "ok");
    }
}
