use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::store::DocumentRegistry;
use super::Database;
use crate::models::IndexStats;
use crate::models::UserDocument;
use crate::Result;

#[derive(sqlx::FromRow)]
struct UserDocRow {
    user_id: String,
    doc_id: String,
    file_name: String,
    kind: String,
    chunk_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserDocRow> for UserDocument {
    type Error = crate::DocQaError;

    fn try_from(row: UserDocRow) -> Result<Self> {
        Ok(Self {
            kind: row.kind.parse()?,
            user_id: row.user_id,
            doc_id: row.doc_id,
            file_name: row.file_name,
            chunk_count: row.chunk_count,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl DocumentRegistry for Database {
    async fn record_document(&self, document: &UserDocument) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO user_docs (user_id, doc_id, file_name, kind, chunk_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, doc_id)
            DO UPDATE SET
                file_name = EXCLUDED.file_name,
                kind = EXCLUDED.kind,
                chunk_count = EXCLUDED.chunk_count,
                created_at = EXCLUDED.created_at
            ",
        )
        .bind(&document.user_id)
        .bind(&document.doc_id)
        .bind(&document.file_name)
        .bind(document.kind.extension())
        .bind(document.chunk_count)
        .bind(document.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<UserDocument>> {
        let rows = sqlx::query_as::<_, UserDocRow>(
            r"
            SELECT user_id, doc_id, file_name, kind, chunk_count, created_at
            FROM user_docs
            WHERE user_id = $1
            ORDER BY created_at ASC, doc_id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserDocument::try_from).collect()
    }

    async fn get_document(&self, user_id: &str, doc_id: &str) -> Result<Option<UserDocument>> {
        let row = sqlx::query_as::<_, UserDocRow>(
            r"
            SELECT user_id, doc_id, file_name, kind, chunk_count, created_at
            FROM user_docs
            WHERE user_id = $1 AND doc_id = $2
            ",
        )
        .bind(user_id)
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserDocument::try_from).transpose()
    }

    async fn remove_document(&self, user_id: &str, doc_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_docs WHERE user_id = $1 AND doc_id = $2")
            .bind(user_id)
            .bind(doc_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let (documents, users) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(DISTINCT user_id) FROM user_docs",
        )
        .fetch_one(&self.pool)
        .await?;

        let chunks = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM document_chunks")
            .fetch_one(&self.pool)
            .await?;

        Ok(IndexStats {
            documents,
            chunks,
            users,
        })
    }
}
