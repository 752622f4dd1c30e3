use super::Database;
use crate::DocQaError;
use crate::Result;

const REQUIRED_TABLES: [&str; 2] = ["document_chunks", "user_docs"];

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        for table_name in REQUIRED_TABLES {
            let exists = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Dimension of the `embedding` column, if the table exists
    pub async fn embedding_column_dimension(&self) -> Result<Option<usize>> {
        // pgvector stores the declared dimension in atttypmod
        let dimension = sqlx::query_scalar::<_, i32>(
            r"
            SELECT a.atttypmod
            FROM pg_attribute a
            JOIN pg_class c ON c.oid = a.attrelid
            WHERE c.relname = 'document_chunks'
            AND a.attname = 'embedding'
            AND NOT a.attisdropped
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(dimension.filter(|d| *d > 0).map(|d| d as usize))
    }

    /// Verify database schema or return helpful error
    pub async fn verify_schema_or_error(&self, dimension: usize) -> Result<()> {
        if !self.is_schema_initialized().await? {
            return Err(DocQaError::Custom(
                "❌ Database schema not initialized!\n\n\
                 Please run the following command to initialize the database:\n\n\
                 \x1b[1;32mdocqa init\x1b[0m"
                    .to_string(),
            ));
        }

        if let Some(existing) = self.embedding_column_dimension().await? {
            if existing != dimension {
                return Err(DocQaError::ConfigError(format!(
                    "embeddings.dimension is {dimension} but document_chunks.embedding is VECTOR({existing}); \
                     re-create the table or change the embedding model"
                )));
            }
        }
        Ok(())
    }

    /// Initialize database schema
    pub async fn init_schema(&self, dimension: usize, create_vector_index: bool) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        // Type modifiers cannot be bound as parameters
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS document_chunks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding VECTOR({dimension}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_document_chunks_user_doc ON document_chunks(user_id, doc_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_docs (
                user_id TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                kind TEXT NOT NULL,
                chunk_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (user_id, doc_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        if create_vector_index {
            sqlx::query(
                r"
                CREATE INDEX IF NOT EXISTS idx_document_chunks_embedding
                ON document_chunks USING hnsw (embedding vector_cosine_ops)
                ",
            )
            .execute(&self.pool)
            .await?;
        }

        tracing::info!(
            "Schema initialized (dimension={}, vector_index={})",
            dimension,
            create_vector_index
        );
        Ok(())
    }
}
