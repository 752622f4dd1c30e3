//! API request and response types

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::models::IngestReport;
use crate::models::RetrievedChunk;
use crate::rag::CacheStats;

/// Chunks retrieved by `/api/search` when the request does not say
pub const DEFAULT_SEARCH_K: usize = 2;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Result of `POST /api/documents`
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: IngestReport,
}

/// Question over all of a user's documents
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub user_id: String,
    #[serde(default)]
    pub k: Option<usize>,
}

/// Question restricted to one named document
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
    pub user_id: String,
    /// Document name given at upload time
    pub name: String,
    #[serde(default)]
    pub k: Option<usize>,
}

/// A retrieved passage as shown to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSnippet {
    pub content: String,
    pub metadata: serde_json::Value,
}

impl From<RetrievedChunk> for DocumentSnippet {
    fn from(retrieved: RetrievedChunk) -> Self {
        Self {
            metadata: json!({
                "user_id": retrieved.chunk.user_id,
                "doc_id": retrieved.chunk.doc_id,
                "chunk_index": retrieved.chunk.chunk_index,
                "similarity": retrieved.similarity,
            }),
            content: retrieved.chunk.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub documents: Vec<DocumentSnippet>,
    pub cached: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub message: String,
    pub user_id: String,
    pub name: String,
    pub query: String,
    pub answer: String,
    pub documents: Vec<DocumentSnippet>,
    pub cached: bool,
}

/// Statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub documents: i64,
    pub chunks: i64,
    pub users: i64,
    pub cache: Option<CacheStats>,
}
