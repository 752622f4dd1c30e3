//! Document ingestion: extract → chunk → embed → store
//!
//! ```rust,no_run
//! use docqa::ingest::IngestService;
//! use docqa::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = IngestService::new(&config).await?;
//!
//!     let report = service.ingest_file("handbook.pdf".as_ref(), "alice", None).await?;
//!     println!("Stored {} chunks", report.chunks);
//!
//!     Ok(())
//! }
//! ```

pub mod chunker;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use tracing::info;
use tracing::warn;

pub use chunker::Chunker;

use crate::config::AppConfig;
use crate::database::ChunkStore;
use crate::database::Database;
use crate::database::DocumentRegistry;
use crate::embeddings::EmbeddingService;
use crate::errors::DocQaError;
use crate::errors::Result;
use crate::extract;
use crate::models::ChunkRecord;
use crate::models::DocumentKind;
use crate::models::IngestReport;
use crate::models::UserDocument;
use crate::rag::AnswerCache;

/// Ingestion pipeline shared by the HTTP upload handler and the CLI
pub struct IngestService {
    chunks: Arc<dyn ChunkStore>,
    registry: Arc<dyn DocumentRegistry>,
    embedding_service: Arc<EmbeddingService>,
    chunker: Chunker,
    cache: Option<AnswerCache>,
}

impl IngestService {
    /// Connect to the database and build every dependency from config
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        database
            .verify_schema_or_error(config.embedding_dimension())
            .await?;
        let embedding_service = Arc::new(EmbeddingService::new(config)?);
        Ok(Self::from_services(
            database.clone(),
            database,
            embedding_service,
            Chunker::from_config(config)?,
        ))
    }

    pub fn from_services(
        chunks: Arc<dyn ChunkStore>,
        registry: Arc<dyn DocumentRegistry>,
        embedding_service: Arc<EmbeddingService>,
        chunker: Chunker,
    ) -> Self {
        Self {
            chunks,
            registry,
            embedding_service,
            chunker,
            cache: None,
        }
    }

    /// Invalidate this cache's entries for a user whenever their documents change
    #[must_use]
    pub fn with_cache(mut self, cache: Option<AnswerCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Ingest one document for a user, replacing any earlier upload with the same id
    pub async fn ingest(
        &self,
        user_id: &str,
        doc_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        kind: DocumentKind,
    ) -> Result<IngestReport> {
        let user_id = require("user_id", user_id)?;
        let doc_id = require("document name", doc_id)?;
        info!("Ingesting {} ({}) for user {}", doc_id, kind, user_id);

        // Step 1: Extract text (CPU-bound, off the async workers)
        debug!("Step 1: Extracting text from {} bytes", bytes.len());
        let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes, kind))
            .await
            .map_err(|e| DocQaError::Extraction(format!("Extraction task failed: {e}")))??;
        let characters = text.chars().count();

        // Step 2: Chunk
        let pieces = self.chunker.split(&text);
        debug!("Step 2: Split {} characters into {} chunks", characters, pieces.len());
        if pieces.is_empty() {
            return Err(DocQaError::EmptyDocument(
                extract::EMPTY_DOCUMENT_MESSAGE.to_string(),
            ));
        }

        // Step 3: Embed
        debug!("Step 3: Embedding {} chunks", pieces.len());
        let embeddings = self.embedding_service.generate_batch(&pieces).await?;

        // Step 4: Replace the document's chunks
        let records: Vec<ChunkRecord> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, content)| ChunkRecord::new(user_id, doc_id, index as i32, content))
            .collect();
        debug!("Step 4: Storing {} chunks", records.len());
        self.chunks
            .replace_document_chunks(user_id, doc_id, &records, &embeddings)
            .await?;

        // Step 5: Record ownership in the side-table
        let document = UserDocument {
            user_id: user_id.to_string(),
            doc_id: doc_id.to_string(),
            file_name: file_name.to_string(),
            kind,
            chunk_count: records.len() as i32,
            created_at: Utc::now(),
        };
        if let Err(e) = self.registry.record_document(&document).await {
            // Chunks are already stored; the side-table is allowed to drift
            warn!(
                "Stored chunks for {}/{} but failed to record the document: {}",
                user_id, doc_id, e
            );
            return Err(e);
        }

        self.invalidate_cache(user_id);

        let documents = self.registry.list_documents(user_id).await?;
        info!(
            "Ingested {} for user {}: {} chunks, {} characters",
            doc_id,
            user_id,
            records.len(),
            characters
        );

        Ok(IngestReport {
            user_id: user_id.to_string(),
            doc_id: doc_id.to_string(),
            chunks: records.len(),
            characters,
            documents,
        })
    }

    /// Read a local file and ingest it; the document name defaults to the file stem
    pub async fn ingest_file(
        &self,
        path: &Path,
        user_id: &str,
        name: Option<&str>,
    ) -> Result<IngestReport> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocQaError::InvalidInput(format!("Not a file: {}", path.display())))?;
        let kind = DocumentKind::from_extension(file_name).ok_or_else(|| {
            DocQaError::UnsupportedDocument("Only PDF or Word files are allowed".to_string())
        })?;
        let doc_id = match name {
            Some(name) => name.to_string(),
            None => default_doc_id(file_name),
        };

        let bytes = tokio::fs::read(path).await?;
        self.ingest(user_id, &doc_id, file_name, bytes, kind).await
    }

    /// Delete a document's chunks and its side-table row
    pub async fn remove(&self, user_id: &str, doc_id: &str) -> Result<()> {
        let user_id = require("user_id", user_id)?;
        let doc_id = require("document name", doc_id)?;

        let removed_chunks = self.chunks.delete_document_chunks(user_id, doc_id).await?;
        let removed_row = self.registry.remove_document(user_id, doc_id).await?;

        if removed_chunks == 0 && !removed_row {
            return Err(DocQaError::DocumentNotFound {
                user_id: user_id.to_string(),
                doc_id: doc_id.to_string(),
            });
        }
        if !removed_row {
            warn!("Removed {} orphan chunks of {}/{}", removed_chunks, user_id, doc_id);
        }

        self.invalidate_cache(user_id);
        info!("Removed {} ({} chunks) for user {}", doc_id, removed_chunks, user_id);
        Ok(())
    }

    pub async fn list_documents(&self, user_id: &str) -> Result<Vec<UserDocument>> {
        let user_id = require("user_id", user_id)?;
        self.registry.list_documents(user_id).await
    }

    fn invalidate_cache(&self, user_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_user(user_id);
        }
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DocQaError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}

/// Document name derived from an uploaded file name (`report.pdf` → `report`)
pub fn default_doc_id(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .trim()
        .to_string()
}

/// Replace anything but `[A-Za-z0-9._-]` so a value is safe as one path component
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Where the original bytes of an upload are kept: `<dir>/<user_id>/<doc_id>.<ext>`
pub fn upload_path(upload_dir: &Path, user_id: &str, doc_id: &str, kind: DocumentKind) -> PathBuf {
    upload_dir
        .join(sanitize_component(user_id))
        .join(format!("{}.{}", sanitize_component(doc_id), kind.extension()))
}

/// An upload written next to its final path, not yet visible there
#[derive(Debug)]
pub struct StagedUpload {
    staging: PathBuf,
    target: PathBuf,
}

impl StagedUpload {
    /// Write `bytes` to a temporary file in the document's upload directory
    pub async fn write(
        upload_dir: &Path,
        user_id: &str,
        doc_id: &str,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<Self> {
        let target = upload_path(upload_dir, user_id, doc_id, kind);
        let dir = target.parent().ok_or_else(|| {
            DocQaError::Custom(format!("Invalid upload path: {}", target.display()))
        })?;
        tokio::fs::create_dir_all(dir).await?;

        let staging = dir.join(format!(".{}.part", uuid::Uuid::new_v4()));
        tokio::fs::write(&staging, bytes).await?;
        Ok(Self { staging, target })
    }

    /// Move the file over the saved original
    pub async fn commit(self) -> Result<PathBuf> {
        if let Err(e) = tokio::fs::rename(&self.staging, &self.target).await {
            let _ = tokio::fs::remove_file(&self.staging).await;
            return Err(e.into());
        }
        debug!("Saved upload to {}", self.target.display());
        Ok(self.target)
    }

    /// Drop the staged file, leaving any earlier original untouched
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.staging).await {
            warn!("Could not remove staged upload {}: {}", self.staging.display(), e);
        }
    }
}

/// Write an upload to its final path via a temporary file in the same directory
pub async fn persist_upload(
    upload_dir: &Path,
    user_id: &str,
    doc_id: &str,
    kind: DocumentKind,
    bytes: &[u8],
) -> Result<PathBuf> {
    StagedUpload::write(upload_dir, user_id, doc_id, kind, bytes)
        .await?
        .commit()
        .await
}

/// Delete the saved original of a document, whichever kind it was; returns how many files went
pub async fn remove_upload(upload_dir: &Path, user_id: &str, doc_id: &str) -> Result<usize> {
    let mut removed = 0;
    for kind in [DocumentKind::Pdf, DocumentKind::Docx] {
        let path = upload_path(upload_dir, user_id, doc_id, kind);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed upload {}", path.display());
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}
