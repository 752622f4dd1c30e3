//! Embedding generation service with batching, validation and normalization

use std::sync::Arc;

use tracing::debug;

use super::client::EmbeddingClient;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::errors::DocQaError;
use crate::errors::Result;

/// Service for generating embeddings in the shape the vector store expects
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub const fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let processed = preprocess(text)?;
        let embedding = self.client.generate(&processed).await?;
        self.finish(embedding)
    }

    /// Generate embeddings for multiple texts, one vector per input in order
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let processed = texts
            .iter()
            .map(|t| preprocess(t))
            .collect::<Result<Vec<_>>>()?;

        let mut embeddings = Vec::with_capacity(processed.len());
        for (batch_idx, batch) in processed.chunks(MAX_BATCH_SIZE).enumerate() {
            debug!(
                "Embedding batch {} ({} texts) with model {}",
                batch_idx + 1,
                batch.len(),
                self.config.model
            );
            let batch_embeddings = self
                .client
                .generate_batch(batch.iter().map(String::as_str).collect())
                .await?;
            if batch_embeddings.len() != batch.len() {
                return Err(DocQaError::EmbeddingError(format!(
                    "Provider returned {} embeddings for {} texts",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            for embedding in batch_embeddings {
                embeddings.push(self.finish(embedding)?);
            }
        }

        Ok(embeddings)
    }

    /// Check the dimension and apply normalization
    fn finish(&self, mut embedding: Vec<f32>) -> Result<Vec<f32>> {
        if embedding.len() != self.config.dimension {
            return Err(DocQaError::EmbeddingError(format!(
                "Model {} returned {} dimensions, expected {}",
                self.config.model,
                embedding.len(),
                self.config.dimension
            )));
        }
        if self.config.normalize {
            l2_normalize(&mut embedding);
        }
        Ok(embedding)
    }
}

/// Collapse whitespace; embedding APIs reject empty input
fn preprocess(text: &str) -> Result<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(DocQaError::EmbeddingError(
            "Empty text provided".to_string(),
        ));
    }
    Ok(normalized)
}

/// Scale a vector to unit length in place; the zero vector is left untouched
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
