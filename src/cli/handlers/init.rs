//! Database initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::AppConfig;
use crate::Result;

/// Handle database initialization command
///
/// Safe to re-run: every statement is `IF NOT EXISTS`.
pub async fn handle_init_command(config: &AppConfig, skip_indexes: bool) -> Result<()> {
    print_info("🗄️  Initializing DocQA database...");
    let database = Database::from_config(config).await?;
    let dimension = config.embedding_dimension();

    if let Some(existing) = database.embedding_column_dimension().await? {
        if existing != dimension {
            print_warning(&format!(
                "document_chunks.embedding is vector({existing}) but embeddings.dimension is {dimension}"
            ));
            print_warning("Drop the document_chunks table or change the configured model.");
        }
    }

    if let Err(e) = database.init_schema(dimension, !skip_indexes).await {
        let message = e.to_string();
        if message.contains("vector") || message.contains("extension") {
            print_warning(&format!("Could not enable pgvector extension: {message}"));
            println!("Run on the database server:");
            println!("  psql -d <database> -c 'CREATE EXTENSION IF NOT EXISTS vector;'");
        }
        return Err(e);
    }

    print_success(&format!("Tables document_chunks (vector({dimension})) and user_docs ready"));
    if skip_indexes {
        print_info("⏭️  Skipped the vector index (--skip-indexes); run `docqa init` again to add it");
    } else {
        print_success("HNSW cosine index ready");
    }

    println!();
    print_success("🎉 Database initialization complete!");
    print_info("To add a document, run:");
    println!("   docqa ingest <file.pdf|file.docx> --user <id>");
    Ok(())
}
