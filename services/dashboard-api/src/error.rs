//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use forecast_common::BundleError;

/// Message returned for any failure the caller cannot fix.
pub const LOAD_FAILURE_MESSAGE: &str = "unable to load region";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A bundle error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BundleError);

impl From<BundleError> for ApiError {
    fn from(err: BundleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            BundleError::InvalidRegion(_) => self.0.to_string(),
            other => {
                error!(error = %other, "Region load failed");
                LOAD_FAILURE_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
