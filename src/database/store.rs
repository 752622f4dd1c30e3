//! Storage seams used by the ingestion and answer pipelines

use async_trait::async_trait;

use crate::models::ChunkRecord;
use crate::models::IndexStats;
use crate::models::RetrievedChunk;
use crate::models::UserDocument;
use crate::Result;

/// Vector storage for document chunks
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Drop any chunks of `(user_id, doc_id)` and insert `chunks` with their embeddings.
    ///
    /// `chunks` and `embeddings` are parallel slices.
    async fn replace_document_chunks(
        &self,
        user_id: &str,
        doc_id: &str,
        chunks: &[ChunkRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<()>;

    /// Nearest chunks to `embedding` among one user's chunks, best first.
    async fn similarity_search(
        &self,
        embedding: &[f32],
        user_id: &str,
        doc_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Returns the number of deleted chunks.
    async fn delete_document_chunks(&self, user_id: &str, doc_id: &str) -> Result<u64>;

    async fn count_chunks(&self, user_id: Option<&str>) -> Result<i64>;
}

/// The `user_docs` side-table
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    /// Insert or update the row for `(user_id, doc_id)`.
    async fn record_document(&self, document: &UserDocument) -> Result<()>;

    /// A user's documents, oldest first.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<UserDocument>>;

    async fn get_document(&self, user_id: &str, doc_id: &str) -> Result<Option<UserDocument>>;

    /// Returns whether a row was deleted.
    async fn remove_document(&self, user_id: &str, doc_id: &str) -> Result<bool>;

    async fn stats(&self) -> Result<IndexStats>;
}
