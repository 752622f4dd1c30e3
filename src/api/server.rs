//! HTTP server implementation

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::ingest::Chunker;
use crate::ingest::IngestService;
use crate::llm::LlmService;
use crate::rag::AnswerCache;
use crate::rag::RagService;
use crate::Result;

/// Room for multipart framing and the text fields around the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// How often expired answers are purged
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

impl AppState {
    /// Connect to the database and build every service from config
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        database
            .verify_schema_or_error(config.embedding_dimension())
            .await?;

        let embedding_service = Arc::new(EmbeddingService::new(config)?);
        let llm_service = LlmService::new(config)?;
        let cache = AnswerCache::from_config(&config.cache);

        let ingest_service = IngestService::from_services(
            database.clone(),
            database.clone(),
            embedding_service.clone(),
            Chunker::from_config(config)?,
        )
        .with_cache(cache.clone());

        let rag_service = RagService::from_services(
            database.clone(),
            database.clone(),
            embedding_service,
            llm_service,
        )
        .with_config(config)
        .with_cache(cache.clone());

        Ok(Self {
            registry: database,
            ingest_service: Arc::new(ingest_service),
            rag_service: Arc::new(rag_service),
            cache,
            upload_dir: config.upload_dir().to_path_buf(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}

/// Assemble the full application router with middleware layers
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let api_router = routes::api_routes(state);

    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting DocQA API server...");

    let state = AppState::from_config(config).await?;
    if let Some(cache) = &state.cache {
        cache.start_cleanup_task(CACHE_CLEANUP_INTERVAL);
        info!(
            "🗄️  Answer cache enabled (ttl {}s, max {} entries)",
            config.cache.ttl_secs, config.cache.max_entries
        );
    }
    tokio::fs::create_dir_all(&state.upload_dir).await?;

    if enable_cors {
        info!("✅ CORS enabled");
    }
    let app = build_app(state, enable_cors);

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET    /api/health                          - Health check");
    info!("  POST   /api/documents                       - Upload a PDF or Word document");
    info!("  GET    /api/users/:user_id/documents        - List a user's documents");
    info!("  DELETE /api/users/:user_id/documents/:doc_id - Remove a document");
    info!("  POST   /api/search                          - Ask across all of a user's documents");
    info!("  POST   /api/answer                          - Ask about one named document");
    info!("  GET    /api/stats                           - Statistics");

    axum::serve(listener, app).await?;

    Ok(())
}
