//! Shared fixtures for unit tests
//!
//! Pipelines run against [`MemoryStore`] and in-process embedding/LLM mocks.
//! Tests that need PostgreSQL read `DOCQA_TEST_DATABASE_URL` and are ignored by default.


use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::config::LlmConfig;
use crate::database::store::memory::MemoryStore;
use crate::database::Database;
use crate::embeddings;
use crate::embeddings::EmbeddingConfig;
use crate::embeddings::EmbeddingProvider;
use crate::embeddings::EmbeddingService;
use crate::extract::docx::tests::build_docx;
use crate::ingest::Chunker;
use crate::ingest::IngestService;
use crate::llm;
use crate::llm::LlmProvider;
use crate::llm::LlmService;
use crate::rag::AnswerCache;
use crate::rag::RagService;
use crate::Result;

pub const TEST_DIMENSION: usize = 32;

/// Services wired to in-memory storage and mock upstreams
pub struct TestServices {
    pub store: Arc<MemoryStore>,
    pub embedding_service: Arc<EmbeddingService>,
    pub llm_service: LlmService,
    pub llm_calls: Arc<AtomicUsize>,
    pub cache: AnswerCache,
}

impl TestServices {
    pub async fn new() -> Self {
        let embeddings_endpoint =
            embeddings::mock::spawn(embeddings::mock::router(TEST_DIMENSION)).await;
        let embedding_service = EmbeddingService::from_config(EmbeddingConfig {
            provider: EmbeddingProvider::Ollama,
            model: "all-minilm".to_string(),
            dimension: TEST_DIMENSION,
            endpoint: embeddings_endpoint,
            api_key: None,
            normalize: true,
        })
        .unwrap();

        let (llm_router, llm_calls) = llm::mock::flaky_router(0);
        let llm_endpoint = embeddings::mock::spawn(llm_router).await;
        let llm_service = LlmService::from_config(&LlmConfig {
            provider: LlmProvider::OpenAI,
            endpoint: llm_endpoint,
            api_key: Some("test-key".to_string()),
            max_retries: 0,
            ..LlmConfig::default()
        })
        .unwrap()
        .with_retry_delay(Duration::from_millis(5));

        Self {
            store: Arc::new(MemoryStore::new()),
            embedding_service: Arc::new(embedding_service),
            llm_service,
            llm_calls,
            cache: AnswerCache::new(Duration::from_secs(60), 64),
        }
    }

    pub fn ingest_service(&self) -> IngestService {
        IngestService::from_services(
            self.store.clone(),
            self.store.clone(),
            self.embedding_service.clone(),
            Chunker::new(200, 40).unwrap(),
        )
        .with_cache(Some(self.cache.clone()))
    }

    pub fn rag_service(&self) -> RagService {
        RagService::from_services(
            self.store.clone(),
            self.store.clone(),
            self.embedding_service.clone(),
            self.llm_service.clone(),
        )
        .with_cache(Some(self.cache.clone()))
    }

    pub fn llm_call_count(&self) -> usize {
        self.llm_calls.load(Ordering::SeqCst)
    }
}

pub fn handbook_docx() -> Vec<u8> {
    build_docx(&[
        "Employee Handbook.",
        "Vacation policy: every employee receives twenty five paid vacation days per year.",
        "Remote work: staff may work remotely up to three days per week with manager approval.",
        "Expense policy: submit receipts within thirty days through the finance portal.",
        "Security: laptops must use full disk encryption and lock after five minutes.",
    ])
}

pub fn recipes_docx() -> Vec<u8> {
    build_docx(&[
        "Grandma's pancake recipe.",
        "Mix flour, milk, two eggs and a pinch of salt, then fry in butter until golden.",
    ])
}

/// Connect to `DOCQA_TEST_DATABASE_URL` and make sure the schema exists
pub async fn create_test_database() -> Result<Database> {
    let mut config = AppConfig::default();
    if let Ok(url) = std::env::var("DOCQA_TEST_DATABASE_URL") {
        config.database.url = url;
    }
    config.embeddings.dimension = TEST_DIMENSION;

    let database = Database::from_config(&config).await?;
    database.init_schema(TEST_DIMENSION, false).await?;
    Ok(database)
}

/// Test helper to clean up a test user's rows
pub async fn cleanup_test_data(database: &Database, user_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM document_chunks WHERE user_id = $1")
        .bind(user_id)
        .execute(database.pool())
        .await?;
    sqlx::query("DELETE FROM user_docs WHERE user_id = $1")
        .bind(user_id)
        .execute(database.pool())
        .await?;
    Ok(())
}
