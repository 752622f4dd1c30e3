//! Router tests driven through `tower::ServiceExt::oneshot`

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

use crate::api::build_app;
use crate::api::AppState;
use crate::extract::pdf::tests::build_pdf;
use crate::models::DOCX_MIME;
use crate::rag::NO_RELEVANT_INFORMATION;
use crate::tests::handbook_docx;
use crate::tests::TestServices;

const BOUNDARY: &str = "docqa-test-boundary";

fn app(services: &TestServices, upload_dir: &Path) -> Router {
    let state = AppState {
        registry: services.store.clone(),
        ingest_service: Arc::new(services.ingest_service()),
        rag_service: Arc::new(services.rag_service()),
        cache: Some(services.cache.clone()),
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
    };
    build_app(state, true)
}

/// Encode multipart form data: text fields then an optional file part
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::post("/api/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn upload_handbook(app: &Router, user_id: &str, name: &str) -> (StatusCode, Value) {
    let docx = handbook_docx();
    let body = multipart_body(
        &[("user_id", user_id), ("name", name)],
        Some(("handbook.docx", DOCX_MIME, &docx)),
    );
    send(app, upload_request(body)).await
}

// ====== Health Tests ======

#[tokio::test]
async fn test_health() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let (status, body) = send(&app, Request::get("/api/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

// ====== Upload Tests ======

#[tokio::test]
async fn test_upload_ingests_and_saves_file() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let (status, body) = upload_handbook(&app, "alice", "handbook").await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["message"], "Document processed and stored successfully");
    assert_eq!(body["data"]["user_id"], "alice");
    assert_eq!(body["data"]["doc_id"], "handbook");
    assert!(body["data"]["chunks"].as_u64().unwrap() >= 1);
    assert_eq!(body["data"]["documents"].as_array().unwrap().len(), 1);
    assert!(dir.path().join("alice").join("handbook.docx").exists());
}

#[tokio::test]
async fn test_upload_pdf_is_searchable() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let pdf = build_pdf(&["Refunds are issued within 30 days of purchase."]);
    let body = multipart_body(&[("user_id", "carol")], Some(("policy.pdf", "application/pdf", &pdf)));
    let (status, body) = send(&app, upload_request(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["doc_id"], "policy");
    assert!(dir.path().join("carol").join("policy.pdf").exists());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            &json!({ "query": "refund window", "user_id": "carol" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["documents"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Refunds"));
}

#[tokio::test]
async fn test_upload_rejects_other_file_types() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let body = multipart_body(
        &[("user_id", "alice")],
        Some(("notes.txt", "text/plain", b"plain text")),
    );
    let (status, body) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Only PDF or Word files are allowed"));
}

#[tokio::test]
async fn test_upload_requires_user_id() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let docx = handbook_docx();
    let body = multipart_body(&[("user_id", "  ")], Some(("handbook.docx", DOCX_MIME, &docx)));
    let (status, body) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("User ID cannot be empty"));
}

#[tokio::test]
async fn test_upload_without_text_is_bad_request() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let blank = crate::extract::docx::tests::build_docx(&[""]);
    let body = multipart_body(&[("user_id", "alice")], Some(("blank.docx", DOCX_MIME, &blank)));
    let (status, body) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text extracted from the document");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let huge = vec![b'x'; 2 * 1024 * 1024];
    let body = multipart_body(&[("user_id", "alice")], Some(("big.pdf", "application/pdf", &huge)));
    let (status, _) = send(&app, upload_request(body)).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_failed_reupload_keeps_saved_original() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;
    let saved = dir.path().join("alice").join("handbook.docx");
    let original = std::fs::read(&saved).unwrap();

    let body = multipart_body(
        &[("user_id", "alice"), ("name", "handbook")],
        Some(("handbook.docx", DOCX_MIME, b"PK not a zip archive")),
    );
    let (status, _) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(std::fs::read(&saved).unwrap(), original);
    assert_eq!(std::fs::read_dir(dir.path().join("alice")).unwrap().count(), 1);
}

#[tokio::test]
async fn test_failed_upload_leaves_no_file() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let body = multipart_body(
        &[("user_id", "alice"), ("name", "contract")],
        Some(("contract.docx", DOCX_MIME, b"PK not a zip archive")),
    );
    let (status, _) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let alice = dir.path().join("alice");
    assert!(!alice.exists() || std::fs::read_dir(&alice).unwrap().count() == 0);
}

// ====== Question Tests ======

#[tokio::test]
async fn test_search_answers_over_user_documents() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            &json!({ "query": "vacation days", "user_id": "alice" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["user_id"], "alice");
    assert_eq!(data["query"], "vacation days");
    assert!(data["response"].as_str().unwrap().starts_with("ANSWER:"));
    let documents = data["documents"].as_array().unwrap();
    assert!(!documents.is_empty() && documents.len() <= 2);
    assert_eq!(documents[0]["metadata"]["user_id"], "alice");
    assert_eq!(documents[0]["metadata"]["doc_id"], "handbook");
}

#[tokio::test]
async fn test_search_without_documents_returns_fixed_answer() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            &json!({ "query": "vacation days", "user_id": "nobody" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["response"], NO_RELEVANT_INFORMATION);
    assert!(body["data"]["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/search", &json!({ "query": "", "user_id": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_oversized_k() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            &json!({ "query": "vacation days", "user_id": "alice", "k": 1_000_000_000u64 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("k must be at most"));
}

#[tokio::test]
async fn test_answer_on_named_document() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;

    let request = json!({ "query": "remote work", "user_id": "alice", "name": "handbook" });
    let (status, body) = send(&app, json_request("POST", "/api/answer", &request)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "handbook");
    assert_eq!(body["data"]["cached"], false);

    let (_, again) = send(&app, json_request("POST", "/api/answer", &request)).await;
    assert_eq!(again["data"]["cached"], true);
    assert_eq!(services.llm_call_count(), 1);
}

#[tokio::test]
async fn test_answer_on_unknown_document_is_404() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/answer",
            &json!({ "query": "remote work", "user_id": "alice", "name": "contract" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("No document found with name 'contract'"));
}

// ====== Document Management Tests ======

#[tokio::test]
async fn test_list_and_remove_documents() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;

    let list = || Request::get("/api/users/alice/documents").body(Body::empty()).unwrap();
    let (status, body) = send(&app, list()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["doc_id"], "handbook");
    assert_eq!(body["data"][0]["kind"], "docx");

    let delete = || {
        Request::delete("/api/users/alice/documents/handbook")
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.path().join("alice").join("handbook.docx").exists());

    let (_, body) = send(&app, list()).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_counts_documents() {
    let services = TestServices::new().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&services, dir.path());
    upload_handbook(&app, "alice", "handbook").await;
    upload_handbook(&app, "bob", "handbook").await;

    let (status, body) = send(&app, Request::get("/api/stats").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["documents"], 2);
    assert_eq!(body["data"]["users"], 2);
    assert!(body["data"]["chunks"].as_i64().unwrap() >= 2);
    assert_eq!(body["data"]["cache"]["hits"], 0);
}
