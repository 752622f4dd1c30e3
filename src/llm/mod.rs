//! Chat-completion client for answer generation
//!
//! Two wire formats are spoken:
//! - OpenAI-compatible `POST {endpoint}/chat/completions` (Mistral, OpenAI, vLLM, LM Studio)
//! - Ollama `POST {endpoint}/api/chat` with `stream: false`

pub mod client;
pub mod prompts;

pub use client::LlmService;
pub use prompts::PromptTemplate;
pub use prompts::RagPrompts;

use serde::Deserialize;
use serde::Serialize;

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[serde(alias = "mistral", alias = "openai-compatible")]
    OpenAI,
    Ollama,
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-process stand-in for chat-completion endpoints
    //!
    //! The reply echoes the last user message so tests can assert on the prompt.

    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::json;
    use serde_json::Value;

    fn last_user_message(body: &Value) -> String {
        body["messages"]
            .as_array()
            .and_then(|messages| {
                messages
                    .iter()
                    .rev()
                    .find(|m| m["role"] == "user")
                    .and_then(|m| m["content"].as_str())
            })
            .unwrap_or_default()
            .to_string()
    }

    /// Endpoints answering `ANSWER: <prompt>`
    pub fn router() -> Router {
        Router::new()
            .route(
                "/chat/completions",
                post(|Json(body): Json<Value>| async move {
                    let content = format!("ANSWER: {}", last_user_message(&body));
                    Json(json!({
                        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
                    }))
                }),
            )
            .route(
                "/api/chat",
                post(|Json(body): Json<Value>| async move {
                    let content = format!("ANSWER: {}", last_user_message(&body));
                    Json(json!({ "message": { "role": "assistant", "content": content }, "done": true }))
                }),
            )
    }

    /// Fails with 503 `failures` times before answering; returns the call counter
    pub fn flaky_router(failures: usize) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| {
                let counter = counter.clone();
                async move {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < failures {
                        return (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response();
                    }
                    let content = format!("ANSWER: {}", last_user_message(&body));
                    Json(json!({ "choices": [{ "message": { "content": content } }] }))
                        .into_response()
                }
            }),
        );
        (router, calls)
    }
}
