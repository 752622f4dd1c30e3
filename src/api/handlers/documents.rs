/// Document upload and management handlers
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use tracing::debug;
use tracing::info;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::UploadResponse;
use crate::errors::DocQaError;
use crate::errors::Result;
use crate::ingest;
use crate::models::DocumentKind;
use crate::models::UserDocument;

/// A file part read from the multipart body
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Upload a PDF or Word document (POST /api/documents)
///
/// Multipart fields: `file`, `user_id` and optionally `name`, the document
/// name used later to ask about it (defaults to the file name without extension).
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>> {
    let mut file: Option<UploadedFile> = None;
    let mut user_id = String::new();
    let mut name: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| DocQaError::InvalidInput(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);

                // Read file data with size limit
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    DocQaError::InvalidInput(format!("Could not read file '{file_name}': {e}"))
                })? {
                    if bytes.len() + chunk.len() > state.max_upload_bytes {
                        return Err(DocQaError::InvalidInput(format!(
                            "File '{}' exceeds maximum size of {} MB",
                            file_name,
                            state.max_upload_bytes / (1024 * 1024)
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "user_id" => {
                user_id = field.text().await.map_err(|e| {
                    DocQaError::InvalidInput(format!("Invalid user_id field: {e}"))
                })?;
            }
            "name" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| DocQaError::InvalidInput(format!("Invalid name field: {e}")))?;
                name = Some(value).filter(|v| !v.trim().is_empty());
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let file = file.ok_or_else(|| DocQaError::InvalidInput("A file is required".to_string()))?;
    info!(
        "POST /api/documents: {} ({:?}, {} bytes) for user {:?}",
        file.file_name,
        file.content_type,
        file.bytes.len(),
        user_id
    );

    let kind = DocumentKind::detect(file.content_type.as_deref(), &file.file_name).ok_or_else(
        || DocQaError::UnsupportedDocument("Only PDF or Word files are allowed".to_string()),
    )?;
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(DocQaError::InvalidInput(
            "User ID cannot be empty".to_string(),
        ));
    }
    let doc_id = name.unwrap_or_else(|| ingest::default_doc_id(&file.file_name));
    let doc_id = doc_id.trim();
    if doc_id.is_empty() {
        return Err(DocQaError::InvalidInput(
            "Document name cannot be empty".to_string(),
        ));
    }

    // The saved original is only replaced once ingestion succeeds
    let staged =
        ingest::StagedUpload::write(&state.upload_dir, user_id, doc_id, kind, &file.bytes).await?;

    let report = match state
        .ingest_service
        .ingest(user_id, doc_id, &file.file_name, file.bytes, kind)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            staged.discard().await;
            return Err(e);
        }
    };
    staged.commit().await?;

    Ok(Json(ApiResponse::success(UploadResponse {
        message: "Document processed and stored successfully".to_string(),
        report,
    })))
}

/// List a user's documents (GET /api/users/:user_id/documents)
pub async fn list_documents(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserDocument>>>> {
    info!("GET /api/users/{}/documents", user_id);
    let documents = state.ingest_service.list_documents(&user_id).await?;
    Ok(Json(ApiResponse::success(documents)))
}

/// Remove a document (DELETE /api/users/:user_id/documents/:doc_id)
pub async fn remove_document(
    State(state): State<AppState>,
    Path((user_id, doc_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<String>>> {
    info!("DELETE /api/users/{}/documents/{}", user_id, doc_id);
    state.ingest_service.remove(&user_id, &doc_id).await?;
    ingest::remove_upload(&state.upload_dir, &user_id, &doc_id).await?;
    Ok(Json(ApiResponse::success(format!("Removed document '{doc_id}'"))))
}
