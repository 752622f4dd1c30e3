//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Document endpoints
        .route("/documents", post(handlers::upload_document))
        .route("/users/:user_id/documents", get(handlers::list_documents))
        .route(
            "/users/:user_id/documents/:doc_id",
            delete(handlers::remove_document),
        )
        // RAG endpoints
        .route("/search", post(handlers::search))
        .route("/answer", post(handlers::answer))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}
