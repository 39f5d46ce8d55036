//! Region list and bundle handlers.

use axum::{
    extract::{Extension, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use bundle_store::CachePolicy;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegionListResponse {
    pub regions: Vec<String>,
}

/// GET /api/regions - Regions available under the data root
pub async fn list_regions_handler(Extension(state): Extension<Arc<AppState>>) -> Json<RegionListResponse> {
    Json(RegionListResponse {
        regions: state.regions.list().await,
    })
}

/// GET /api/regions/:region/bundle - Normalized bundle for one region
#[instrument(skip_all, fields(region = %region))]
pub async fn region_bundle_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(region): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bundle = state.resolver.resolve(&region).await?;

    let cache_control = match state.config.mode.cache_policy() {
        CachePolicy::Enabled => "max-age=60",
        CachePolicy::Disabled => "no-cache",
    };

    Ok(([(header::CACHE_CONTROL, cache_control)], Json(bundle)))
}
