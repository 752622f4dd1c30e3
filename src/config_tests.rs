//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;
    use crate::embeddings::EmbeddingProvider;
    use crate::errors::DocQaError;
    use crate::llm::LlmProvider;

    // ====== Default Value Tests ======

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.max_connections(), 10);
        assert_eq!(config.min_connections(), 1);
        assert_eq!(config.connection_timeout(), 30);

        assert_eq!(config.embedding_dimension(), 384);
        assert_eq!(config.embedding_model(), "all-minilm");
        assert!(config.embeddings.normalize);
        assert_eq!(config.embeddings.provider, EmbeddingProvider::Ollama);

        assert_eq!(config.llm_model(), "mistral-large-latest");
        assert_eq!(config.llm.provider, LlmProvider::OpenAI);
        assert_eq!(config.llm.max_retries, 1);
        assert!(config.llm.temperature.abs() < f32::EPSILON);

        assert_eq!(config.top_k(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chunking_defaults_match_token_budget() {
        // ~300 tokens with ~40 tokens of overlap at four characters per token
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 1200);
        assert_eq!(config.chunk_overlap, 160);
    }

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl_secs, 3600);
        assert_eq!(config.max_entries, 1024);
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            url = "postgresql://u:p@db:5432/rag"

            [llm]
            provider = "ollama"
            endpoint = "http://localhost:11434"
            model = "llama3"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url(), "postgresql://u:p@db:5432/rag");
        assert_eq!(config.max_connections(), 10);
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm_model(), "llama3");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.chunk_size(), ChunkingConfig::default().chunk_size);
        assert_eq!(config.server.upload_dir, "uploads");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [embeddings]
            provider = "carrier-pigeon"
            "#,
        );
        assert!(matches!(result, Err(DocQaError::TomlParsing(_))));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [retrieval]
            top_k = 3

            [embeddings]
            provider = "openai"
            endpoint = "https://api.openai.com/v1"
            model = "text-embedding-3-small"
            dimension = 1536
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.top_k(), 3);
        assert_eq!(config.embeddings.provider, EmbeddingProvider::OpenAI);
        assert_eq!(config.embedding_dimension(), 1536);
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(DocQaError::Io(_))));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(DocQaError::ConfigError(_))));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_top_k_above_limit_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = crate::rag::MAX_TOP_K + 1;
        assert!(config.validate().is_err());
        config.retrieval.top_k = crate::rag::MAX_TOP_K;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_bounds_checked() {
        let mut config = AppConfig::default();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = AppConfig::default();
        config.llm.endpoint = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.endpoint"));
    }
}
