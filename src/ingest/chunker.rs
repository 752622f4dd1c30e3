//! Character-sized text chunking

use text_splitter::Characters;
use text_splitter::ChunkConfig;
use text_splitter::TextSplitter;

use crate::errors::DocQaError;
use crate::errors::Result;

/// Splits extracted text into overlapping passages of at most `chunk_size` characters
pub struct Chunker {
    splitter: TextSplitter<Characters>,
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocQaError::ConfigError(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| DocQaError::ConfigError(format!("chunk overlap: {e}")))?
            .with_trim(true);

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        Self::new(config.chunk_size(), config.chunk_overlap())
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Non-empty chunks in document order
    pub fn split(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .filter(|chunk| !chunk.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
