//! Per-user semantic retrieval

use std::sync::Arc;

use tracing::debug;

use crate::database::ChunkStore;
use crate::embeddings::EmbeddingService;
use crate::errors::DocQaError;
use crate::errors::Result;
use crate::models::RetrievedChunk;

/// Upper bound on chunks retrieved for one question
pub const MAX_TOP_K: usize = 100;

/// Reject a `k` outside `1..=MAX_TOP_K`
pub fn check_top_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(DocQaError::InvalidInput("k must be greater than 0".to_string()));
    }
    if k > MAX_TOP_K {
        return Err(DocQaError::InvalidInput(format!(
            "k must be at most {MAX_TOP_K}, got {k}"
        )));
    }
    Ok(())
}

/// Embeds a question and finds the closest chunks among one user's documents
pub struct Retriever {
    store: Arc<dyn ChunkStore>,
    embedding_service: Arc<EmbeddingService>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(store: Arc<dyn ChunkStore>, embedding_service: Arc<EmbeddingService>) -> Self {
        Self {
            store,
            embedding_service,
        }
    }

    /// Top `k` chunks for `query`, best first, optionally limited to one document
    pub async fn retrieve(
        &self,
        query: &str,
        user_id: &str,
        doc_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let query = query.trim();
        let user_id = user_id.trim();
        let doc_id = doc_id.map(str::trim);
        if query.is_empty() {
            return Err(DocQaError::InvalidInput("Query cannot be empty".to_string()));
        }
        if user_id.is_empty() {
            return Err(DocQaError::InvalidInput("user_id cannot be empty".to_string()));
        }
        check_top_k(k)?;

        debug!(
            "Performing semantic search for user {} (doc: {:?}, k: {}): {}",
            user_id, doc_id, k, query
        );

        let query_embedding = self.embedding_service.generate(query).await?;
        let mut results = self
            .store
            .similarity_search(&query_embedding, user_id, doc_id, k)
            .await?;

        // Best first, whatever order the store returned
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(k);

        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }
}
