/// Stats-related API handlers
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::StatsResponse;
use crate::errors::Result;

/// Get stats (GET /api/stats)
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<StatsResponse>>> {
    info!("GET /api/stats");

    let stats = state.registry.stats().await?;

    Ok(Json(ApiResponse::success(StatsResponse {
        documents: stats.documents,
        chunks: stats.chunks,
        users: stats.users,
        cache: state.cache.as_ref().map(crate::rag::AnswerCache::stats),
    })))
}
