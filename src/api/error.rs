//! Error responses

use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::warn;

use crate::api::types::ApiResponse;
use crate::errors::DocQaError;

impl IntoResponse for DocQaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
