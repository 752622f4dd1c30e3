use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::ChatMessage;
use super::LlmProvider;
use crate::config::AppConfig;
use crate::config::LlmConfig;
use crate::errors::DocQaError;
use crate::errors::Result;

/// Fixed pause between attempts
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Generation client shared by the API and CLI
#[derive(Clone)]
pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_delay: Duration,
    client: Client,
}

/// Outcome of one attempt: whether trying again could help
enum AttemptError {
    Retryable(DocQaError),
    Fatal(DocQaError),
}

impl LlmService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_config(&config.llm)
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocQaError::HttpError(e.to_string()))?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if config.provider == LlmProvider::OpenAI && api_key.is_none() {
            warn!(
                "No llm.api_key configured for {}; requests will be sent without authorization",
                config.endpoint
            );
        }

        Ok(Self {
            provider: config.provider,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
            client,
        })
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    pub const fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Generate a completion for a single user prompt with configured parameters
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_params(prompt, self.temperature, self.max_tokens)
            .await
    }

    pub async fn generate_with_params(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        self.chat(&[ChatMessage::user(prompt)], temperature, max_tokens)
            .await
    }

    /// Run a chat completion, retrying transient failures `max_retries` times
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.attempt(messages, temperature, max_tokens).await {
                Ok(content) => return Ok(content),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(e)) if attempt < attempts => {
                    warn!(
                        "LLM call failed (attempt {}/{}): {}; retrying",
                        attempt, attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(AttemptError::Retryable(e)) => return Err(e),
            }
        }
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> std::result::Result<String, AttemptError> {
        let request = match self.provider {
            LlmProvider::OpenAI => {
                let body = OpenAIChatRequest {
                    model: &self.model,
                    messages,
                    temperature,
                    max_tokens,
                    stream: false,
                };
                let mut builder = self
                    .client
                    .post(format!("{}/chat/completions", self.endpoint))
                    .json(&body);
                if let Some(key) = &self.api_key {
                    builder = builder.bearer_auth(key);
                }
                builder
            }
            LlmProvider::Ollama => {
                let body = OllamaChatRequest {
                    model: &self.model,
                    messages,
                    stream: false,
                    options: OllamaOptions {
                        temperature,
                        num_predict: max_tokens,
                    },
                };
                self.client
                    .post(format!("{}/api/chat", self.endpoint))
                    .json(&body)
            }
        };

        debug!("Calling {:?} chat API with model {}", self.provider, self.model);

        let response = request.send().await.map_err(|e| {
            AttemptError::Retryable(DocQaError::HttpError(format!("LLM request failed: {e}")))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = DocQaError::LlmError(format!("LLM API error ({status}): {text}"));
            return Err(if is_transient(status) {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        let content = match self.provider {
            LlmProvider::OpenAI => {
                let payload: OpenAIChatResponse = response.json().await.map_err(|e| {
                    AttemptError::Fatal(DocQaError::LlmError(format!(
                        "Failed to parse response: {e}"
                    )))
                })?;
                payload
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
            }
            LlmProvider::Ollama => {
                let payload: OllamaChatResponse = response.json().await.map_err(|e| {
                    AttemptError::Fatal(DocQaError::LlmError(format!(
                        "Failed to parse response: {e}"
                    )))
                })?;
                payload.message.and_then(|m| m.content)
            }
        };

        match content.map(|c| c.trim().to_string()) {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(AttemptError::Fatal(DocQaError::LlmError(
                "LLM returned an empty completion".to_string(),
            ))),
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<ResponseMessage>,
}
