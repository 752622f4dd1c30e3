//! Embeddings generation module
//!
//! This module provides functionality for generating text embeddings using various providers:
//! - OpenAI-compatible `/embeddings` endpoints (OpenAI, Mistral, vLLM, ...)
//! - Ollama (local models such as `all-minilm`)
//!
//! # Examples
//!
//! ```rust,no_run
//! use docqa::embeddings::EmbeddingService;
//! use docqa::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 64;

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub normalize: bool,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let embeddings = &config.embeddings;
        Self {
            provider: embeddings.provider,
            model: embeddings.model.clone(),
            dimension: embeddings.dimension,
            endpoint: embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key: embeddings.api_key.clone().filter(|k| !k.is_empty()),
            normalize: embeddings.normalize,
        }
    }
}
