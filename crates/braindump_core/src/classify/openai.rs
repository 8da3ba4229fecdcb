//! OpenAI chat-completions backend.
//!
//! # Responsibility
//! - Frame a `CompletionRequest` as a chat-completions POST with bearer auth.
//! - Extract `choices[0].message.content` from the response envelope.
//!
//! # Invariants
//! - Non-success statuses never expose the response body to callers.
//! - The API key is only sent in the `Authorization` header.

use super::backend::{CompletionBackend, CompletionRequest};
use super::error::{ClassifyError, UPSTREAM_STATUS_MESSAGE};
use crate::config::{ClassifierConfig, API_KEY_ENV};
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiBackend {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiBackend {
    /// Creates a backend from config.
    ///
    /// # Errors
    /// - `Configuration` when the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder().build().map_err(|err| {
            ClassifyError::Configuration(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }

    /// JSON body sent for `request`.
    pub fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let body = self.chat_request(request);
        serde_json::to_value(&body).unwrap_or(serde_json::Value::Null)
    }

    fn chat_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        }
    }

    fn api_key(&self) -> Result<&str, ClassifyError> {
        self.api_key.as_deref().ok_or_else(|| {
            ClassifyError::Configuration(format!(
                "OpenAI API key is not configured (set {API_KEY_ENV})"
            ))
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn ensure_configured(&self) -> Result<(), ClassifyError> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClassifyError> {
        let api_key = self.api_key()?;
        let started_at = Instant::now();

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.chat_request(request))
            .send()
            .await
            .map_err(|err| ClassifyError::Upstream(format!("AI request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=openai_call module=classify status=error http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(ClassifyError::Upstream(UPSTREAM_STATUS_MESSAGE.to_string()));
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ClassifyError::Parse(format!("invalid completion envelope: {err}")))?;
        info!(
            "event=openai_call module=classify status=ok http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClassifyError::Parse("completion has no message content".to_string()))
    }
}
