//! Document ingestion and management handlers

use std::path::Path;

use crate::cli::output::print_document_list;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::ingest;
use crate::ingest::IngestService;
use crate::models::DocumentKind;
use crate::AppConfig;
use crate::Result;

/// Ingest a local file and keep a copy under the upload directory
pub async fn handle_ingest_command(
    config: &AppConfig,
    file: &Path,
    user_id: &str,
    name: Option<&str>,
) -> Result<()> {
    print_info(&format!("📄 Ingesting {} for user {user_id}", file.display()));

    let service = IngestService::new(config).await?;
    let report = service.ingest_file(file, user_id, name).await?;

    // Mirror what the HTTP upload keeps on disk
    if let Some(kind) = file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(DocumentKind::from_extension)
    {
        let bytes = tokio::fs::read(file).await?;
        let saved =
            ingest::persist_upload(config.upload_dir(), &report.user_id, &report.doc_id, kind, &bytes)
                .await?;
        print_info(&format!("Saved a copy to {}", saved.display()));
    }

    print_success(&format!(
        "Stored '{}': {} chunks from {} characters",
        report.doc_id, report.chunks, report.characters
    ));
    println!();
    print_document_list(&report.user_id, &report.documents);
    Ok(())
}

pub async fn handle_docs_command(config: &AppConfig, user_id: &str) -> Result<()> {
    let service = IngestService::new(config).await?;
    let documents = service.list_documents(user_id).await?;
    print_document_list(user_id, &documents);
    Ok(())
}

pub async fn handle_remove_command(config: &AppConfig, user_id: &str, doc_id: &str) -> Result<()> {
    let service = IngestService::new(config).await?;
    service.remove(user_id, doc_id).await?;

    ingest::remove_upload(config.upload_dir(), user_id, doc_id).await?;

    print_success(&format!("Removed document '{doc_id}' for user {user_id}"));
    Ok(())
}
