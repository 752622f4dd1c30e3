use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::errors::DocQaError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document formats accepted for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(content_type: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_extension(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// MIME type first, file extension as fallback
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        content_type
            .and_then(Self::from_mime)
            .or_else(|| Self::from_extension(file_name))
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentKind {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            other => Err(DocQaError::UnsupportedDocument(format!(
                "Unknown document kind: {other}"
            ))),
        }
    }
}

/// A document a user has ingested (one row of the `user_docs` side-table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub user_id: String,
    pub doc_id: String,
    pub file_name: String,
    pub kind: DocumentKind,
    pub chunk_count: i32,
    pub created_at: DateTime<Utc>,
}

/// One embedded passage of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub user_id: String,
    pub doc_id: String,
    pub chunk_index: i32,
    pub content: String,
}

impl ChunkRecord {
    pub fn new(user_id: &str, doc_id: &str, chunk_index: i32, content: String) -> Self {
        Self {
            id: Self::chunk_id(user_id, doc_id, chunk_index),
            user_id: user_id.to_string(),
            doc_id: doc_id.to_string(),
            chunk_index,
            content,
        }
    }

    /// Deterministic id so a re-upload overwrites the same rows
    ///
    /// Hex SHA-256 over length-prefixed parts, so no choice of user or
    /// document name can produce another pair's id.
    pub fn chunk_id(user_id: &str, doc_id: &str, chunk_index: i32) -> String {
        let mut hasher = Sha256::new();
        for part in [user_id, doc_id] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.update(chunk_index.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A chunk returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    #[serde(flatten)]
    pub chunk: ChunkRecord,
    /// 1 - cosine distance
    pub similarity: f64,
}

impl RetrievedChunk {
    pub fn content(&self) -> &str {
        &self.chunk.content
    }
}

/// Index-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: i64,
    pub chunks: i64,
    pub users: i64,
}

/// Result of ingesting a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub user_id: String,
    pub doc_id: String,
    pub chunks: usize,
    pub characters: usize,
    /// The user's documents after ingestion
    pub documents: Vec<UserDocument>,
}
