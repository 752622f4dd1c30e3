/// RAG-related API handlers
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::AnswerRequest;
use crate::api::types::AnswerResponse;
use crate::api::types::ApiResponse;
use crate::api::types::DocumentSnippet;
use crate::api::types::SearchRequest;
use crate::api::types::SearchResponse;
use crate::api::types::DEFAULT_SEARCH_K;
use crate::errors::Result;
use crate::rag::RagQuery;

/// Answer a question over all of a user's documents (POST /api/search)
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>> {
    info!("POST /api/search for user {}: {}", req.user_id, req.query);

    let query = RagQuery::new(req.query.clone(), req.user_id.clone())
        .with_top_k(req.k.unwrap_or(DEFAULT_SEARCH_K));
    let response = state.rag_service.answer(query).await?;

    Ok(Json(ApiResponse::success(SearchResponse {
        message: "Search and generation completed successfully".to_string(),
        user_id: req.user_id,
        query: req.query,
        response: response.answer,
        documents: response.sources.into_iter().map(DocumentSnippet::from).collect(),
        cached: response.cached,
    })))
}

/// Answer a question about one named document (POST /api/answer)
pub async fn answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ApiResponse<AnswerResponse>>> {
    info!(
        "POST /api/answer for user {} on {}: {}",
        req.user_id, req.name, req.query
    );

    let mut query = RagQuery::new(req.query.clone(), req.user_id.clone()).with_doc(req.name.clone());
    query.top_k = req.k;
    let response = state.rag_service.answer(query).await?;

    Ok(Json(ApiResponse::success(AnswerResponse {
        message: "Answer generated!".to_string(),
        user_id: req.user_id,
        name: req.name,
        query: req.query,
        answer: response.answer,
        documents: response.sources.into_iter().map(DocumentSnippet::from).collect(),
        cached: response.cached,
    })))
}
