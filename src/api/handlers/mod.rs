/// API request handlers
use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::database::DocumentRegistry;
use crate::ingest::IngestService;
use crate::rag::AnswerCache;
use crate::rag::RagService;

// Re-export sub-modules
pub mod documents;
pub mod rag;
pub mod stats;

// Re-export handlers
pub use documents::*;
pub use rag::*;
pub use stats::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn DocumentRegistry>,
    pub ingest_service: Arc<IngestService>,
    pub rag_service: Arc<RagService>,
    pub cache: Option<AnswerCache>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
