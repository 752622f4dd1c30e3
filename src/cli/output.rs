//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `docqa` CLI

use crate::models::IndexStats;
use crate::models::RetrievedChunk;
use crate::models::UserDocument;
use crate::rag::CacheStats;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print a user's documents
pub fn print_document_list(user_id: &str, documents: &[UserDocument]) {
    if documents.is_empty() {
        println!("No documents for user {user_id}");
        return;
    }
    println!("📚 {} document(s) for user {user_id}:", documents.len());
    for doc in documents {
        println!(
            "  - {} | {} | {} | {} chunks | {}",
            doc.doc_id,
            doc.kind,
            doc.file_name,
            doc.chunk_count,
            doc.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}

/// Print the chunks an answer was built from
pub fn print_sources(sources: &[RetrievedChunk]) {
    println!("\n📚 Sources ({} chunks):", sources.len());
    for (idx, source) in sources.iter().enumerate() {
        println!(
            "  {}. {} #{} | Similarity: {:.2}% | \"{}\"",
            idx + 1,
            source.chunk.doc_id,
            source.chunk.chunk_index,
            source.similarity * 100.0,
            truncate_str(&source.content().replace('\n', " "), 80)
        );
    }
}

/// Print an answer between rules
pub fn print_answer(answer: &str, cached: bool) {
    println!("\n{}", "═".repeat(80));
    println!("📝 Answer{}:\n", if cached { " (cached)" } else { "" });
    println!("{}", answer.trim());
    println!("{}", "═".repeat(80));
}

/// Print index statistics
pub fn print_statistics(stats: &IndexStats, cache: Option<&CacheStats>) {
    println!("📊 DocQA Statistics");
    println!("===================");
    println!();
    println!("📈 Index:");
    println!("  Users: {}", stats.users);
    println!("  Documents: {}", stats.documents);
    println!("  Chunks: {}", stats.chunks);
    if stats.documents > 0 {
        println!(
            "  Avg chunks per document: {:.1}",
            stats.chunks as f64 / stats.documents as f64
        );
    }

    if let Some(cache) = cache {
        println!();
        println!("🗄️  Answer cache:");
        println!("  Entries: {}/{}", cache.entries, cache.max_entries);
        println!("  Hit rate: {:.1}%", cache.hit_rate() * 100.0);
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 DocQA Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", mask_database_url(config.database_url()));
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!("  Directory: {}", config.logging.directory);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {:?}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Normalize: {}", config.embeddings.normalize);
    println!();

    println!("✂️  Chunking:");
    println!("  Chunk size: {} chars", config.chunk_size());
    println!("  Overlap: {} chars", config.chunk_overlap());
    println!();

    println!("🔍 Retrieval:");
    println!("  Top k: {}", config.top_k());
    println!("  Max context: {} chars", config.retrieval.max_context_chars);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {:?}", config.llm.provider);
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Key: {}", mask_secret(config.llm.api_key.as_deref()));
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max tokens: {}", config.llm.max_tokens);
    println!("  Retries: {}", config.llm.max_retries);
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!("  Upload dir: {}", config.upload_dir().display());
    println!(
        "  Max upload: {} MB",
        config.server.max_upload_bytes / (1024 * 1024)
    );
    println!();

    println!("🗄️  Cache:");
    println!("  Enabled: {}", config.cache.enabled);
    println!("  TTL: {}s", config.cache.ttl_secs);
    println!("  Max entries: {}", config.cache.max_entries);
}

/// Mask database URL for logging (hide password)
pub fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            format!(
                "{}://{}@{}:{}{}",
                parsed.scheme(),
                parsed.username(),
                host,
                parsed.port().unwrap_or(5432),
                parsed.path()
            )
        } else {
            "***masked***".to_string()
        }
    } else {
        "***invalid***".to_string()
    }
}

fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None | Some("") => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "****".to_string(),
        Some(s) => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

pub fn print_prompt(msg: &str) -> std::io::Result<()> {
    print!("{msg}");
    std::io::Write::flush(&mut std::io::stdout())
}
