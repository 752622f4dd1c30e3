use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocQaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("{0}")]
    EmptyDocument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No document found with name '{doc_id}'. Please upload and extract first.")]
    DocumentNotFound { user_id: String, doc_id: String },

    #[error("{0}")]
    Custom(String),
}

impl DocQaError {
    /// HTTP status used when this error crosses the API boundary
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UnsupportedDocument(_) | Self::EmptyDocument(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::HttpError(_) | Self::EmbeddingError(_) | Self::LlmError(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller sent something we refuse to process
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

pub type Result<T> = std::result::Result<T, DocQaError>;
