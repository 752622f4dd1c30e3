use async_trait::async_trait;
use pgvector::Vector;

use super::store::ChunkStore;
use super::Database;
use crate::models::ChunkRecord;
use crate::models::RetrievedChunk;
use crate::DocQaError;
use crate::Result;

#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: String,
    user_id: String,
    doc_id: String,
    chunk_index: i32,
    content: String,
    similarity: f64,
}

impl From<ChunkRow> for RetrievedChunk {
    fn from(row: ChunkRow) -> Self {
        Self {
            chunk: ChunkRecord {
                id: row.id,
                user_id: row.user_id,
                doc_id: row.doc_id,
                chunk_index: row.chunk_index,
                content: row.content,
            },
            similarity: row.similarity,
        }
    }
}

#[async_trait]
impl ChunkStore for Database {
    async fn replace_document_chunks(
        &self,
        user_id: &str,
        doc_id: &str,
        chunks: &[ChunkRecord],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(DocQaError::Custom(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut tx = self.pool.begin().await?;

        // First, clear existing chunks for this document
        let removed = sqlx::query("DELETE FROM document_chunks WHERE user_id = $1 AND doc_id = $2")
            .bind(user_id)
            .bind(doc_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed > 0 {
            tracing::debug!("Replacing {} old chunks of {}/{}", removed, user_id, doc_id);
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            sqlx::query(
                r"
                INSERT INTO document_chunks (id, user_id, doc_id, chunk_index, content, embedding)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id)
                DO UPDATE SET
                    user_id = EXCLUDED.user_id,
                    doc_id = EXCLUDED.doc_id,
                    chunk_index = EXCLUDED.chunk_index,
                    content = EXCLUDED.content,
                    embedding = EXCLUDED.embedding,
                    created_at = NOW()
                ",
            )
            .bind(&chunk.id)
            .bind(&chunk.user_id)
            .bind(&chunk.doc_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.content)
            .bind(Vector::from(embedding.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        user_id: &str,
        doc_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            r"
            SELECT
                id,
                user_id,
                doc_id,
                chunk_index,
                content,
                1 - (embedding <=> $1) AS similarity
            FROM document_chunks
            WHERE user_id = $2
            AND ($3::text IS NULL OR doc_id = $3)
            ORDER BY embedding <=> $1
            LIMIT $4
            ",
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(user_id)
        .bind(doc_id)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RetrievedChunk::from).collect())
    }

    async fn delete_document_chunks(&self, user_id: &str, doc_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM document_chunks WHERE user_id = $1 AND doc_id = $2")
            .bind(user_id)
            .bind(doc_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_chunks(&self, user_id: Option<&str>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM document_chunks WHERE ($1::text IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
