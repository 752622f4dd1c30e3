//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::database::ChunkStore;
use crate::database::Database;
use crate::database::DocumentRegistry;
use crate::embeddings::EmbeddingService;
use crate::errors::DocQaError;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::llm::RagPrompts;
use crate::models::RetrievedChunk;
use crate::rag::AnswerCache;
use crate::rag::ContextAssembler;
use crate::rag::retriever::check_top_k;
use crate::rag::Retriever;

/// Answer returned when nothing in the user's documents matches the question
pub const NO_RELEVANT_INFORMATION: &str =
    "I could not find any relevant information in your documents to answer this question.";

/// Default number of chunks retrieved when neither the query nor config says otherwise
pub const DEFAULT_TOP_K: usize = 5;

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    registry: Arc<dyn DocumentRegistry>,
    context_assembler: ContextAssembler,
    llm_service: LlmService,
    cache: Option<AnswerCache>,
    default_top_k: usize,
}

impl RagService {
    /// Create a new RAG service
    ///
    /// # Errors
    /// - Database connection errors
    /// - Embedding service configuration errors (invalid endpoints)
    /// - LLM service configuration errors
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        database
            .verify_schema_or_error(config.embedding_dimension())
            .await?;
        let embedding_service = Arc::new(EmbeddingService::new(config)?);
        let llm_service = LlmService::new(config)?;

        Ok(
            Self::from_services(database.clone(), database, embedding_service, llm_service)
                .with_config(config)
                .with_cache(AnswerCache::from_config(&config.cache)),
        )
    }

    /// Create from existing services
    #[must_use]
    pub fn from_services(
        store: Arc<dyn ChunkStore>,
        registry: Arc<dyn DocumentRegistry>,
        embedding_service: Arc<EmbeddingService>,
        llm_service: LlmService,
    ) -> Self {
        Self {
            retriever: Retriever::new(store, embedding_service),
            registry,
            context_assembler: ContextAssembler::default(),
            llm_service,
            cache: None,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Apply retrieval defaults from the `[retrieval]` section
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.default_top_k = config.top_k();
        self.context_assembler = ContextAssembler::new(config.retrieval.max_context_chars);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Option<AnswerCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Answer a question over all of a user's documents with default options
    pub async fn query(&self, question: &str, user_id: &str) -> Result<RagResponse> {
        self.answer(RagQuery::new(question, user_id)).await
    }

    /// Perform a RAG query
    ///
    /// # Errors
    /// - `InvalidInput` for an empty question or user id, or `top_k` outside `1..=MAX_TOP_K`
    /// - `DocumentNotFound` when `doc_id` names a document the user never uploaded
    /// - Embedding, database and LLM failures
    pub async fn answer(&self, query: RagQuery) -> Result<RagResponse> {
        let question = query.question.trim();
        let user_id = query.user_id.trim();
        let doc_id = query.doc_id.as_deref().map(str::trim);
        if question.is_empty() {
            return Err(DocQaError::InvalidInput("Query cannot be empty".to_string()));
        }
        if user_id.is_empty() {
            return Err(DocQaError::InvalidInput("user_id cannot be empty".to_string()));
        }
        let top_k = query.top_k.unwrap_or(self.default_top_k);
        check_top_k(top_k)?;

        info!("Processing RAG query for user {}: {}", user_id, question);

        // Step 0: Cached answer
        let cache_key = AnswerCache::key(user_id, doc_id, top_k, question);
        let generation = self.cache.as_ref().map(|cache| cache.generation(user_id));
        if let Some(cache) = &self.cache {
            if let Some(mut cached) = cache.get(&cache_key) {
                info!("Answered from cache");
                cached.cached = true;
                return Ok(cached);
            }
        }

        // Step 1: A named document must belong to the user
        if let Some(doc_id) = doc_id {
            if self.registry.get_document(user_id, doc_id).await?.is_none() {
                return Err(DocQaError::DocumentNotFound {
                    user_id: user_id.to_string(),
                    doc_id: doc_id.to_string(),
                });
            }
        }

        // Step 2: Retrieve relevant chunks
        debug!("Step 2: Retrieving chunks");
        let chunks = self
            .retriever
            .retrieve(question, user_id, doc_id, top_k)
            .await?;

        if chunks.is_empty() {
            info!("No relevant chunks for user {}", user_id);
            return Ok(RagResponse {
                answer: NO_RELEVANT_INFORMATION.to_string(),
                sources: Vec::new(),
                context: String::new(),
                cached: false,
            });
        }

        // Step 3: Assemble context
        debug!("Step 3: Assembling context from {} chunks", chunks.len());
        let (context, sources) = self.context_assembler.assemble_with_sources(&chunks);

        // Step 4: Generate answer using LLM
        debug!("Step 4: Generating answer");
        let prompt = RagPrompts::build_qa_prompt(question, &context);
        let answer = self
            .llm_service
            .generate_with_params(
                &prompt,
                query.temperature.unwrap_or_else(|| self.llm_service.temperature()),
                query.max_tokens.unwrap_or_else(|| self.llm_service.max_tokens()),
            )
            .await?;

        info!("RAG query completed successfully");

        let response = RagResponse {
            answer,
            sources,
            context,
            cached: false,
        };
        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            cache.insert_if_current(cache_key, user_id, generation, response.clone());
        }
        Ok(response)
    }

    /// Retrieve chunks without LLM generation
    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        k: Option<usize>,
    ) -> Result<Vec<RetrievedChunk>> {
        self.retriever
            .retrieve(query, user_id, None, k.unwrap_or(self.default_top_k))
            .await
    }

    /// Get retriever reference
    #[must_use]
    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    #[must_use]
    pub const fn cache(&self) -> Option<&AnswerCache> {
        self.cache.as_ref()
    }

    #[must_use]
    pub const fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}

/// A question to answer; unset options fall back to service defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagQuery {
    pub question: String,
    pub user_id: String,
    /// Restrict retrieval to one of the user's documents
    pub doc_id: Option<String>,
    pub top_k: Option<usize>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl RagQuery {
    pub fn new(question: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// RAG response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    /// Chunks whose text went into the prompt, best first
    pub sources: Vec<RetrievedChunk>,
    pub context: String,
    /// Served from the answer cache
    pub cached: bool,
}

impl RagResponse {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({} chunks):\n", self.sources.len()));

        for (idx, source) in self.sources.iter().enumerate().take(5) {
            output.push_str(&format!(
                "  {}. {} #{} (similarity: {:.2})\n",
                idx + 1,
                source.chunk.doc_id,
                source.chunk.chunk_index,
                source.similarity
            ));
        }

        output
    }
}
