//! Dashboard API Service Library
//!
//! HTTP front end for region bundle resolution: region listing, per-region
//! bundles and health probes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::state::AppState;

/// Build the service router. Middleware is layered on by the binary.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Regions
        .route("/api/regions", get(handlers::regions::list_regions_handler))
        .route(
            "/api/regions/:region/bundle",
            get(handlers::regions::region_bundle_handler),
        )
        // Health
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .layer(Extension(state))
}
