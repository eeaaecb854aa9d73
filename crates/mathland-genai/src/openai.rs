//! OpenAI-compatible chat completions client.
//!
//! Structured outputs on this API require an object at the schema root, so
//! the caller's schema is wrapped in `{ "result": ... }` on the way out and
//! unwrapped on the way back.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{http_client, status_error, GenaiError, GenerationRequest, Result, TextGenerator};

/// Public OpenAI API base URL.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const WRAPPER_FIELD: &str = "result";

/// Client for any OpenAI-compatible `chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiClient {
    /// Creates a client for the given key and model against the public API.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Points the client at a different host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn payload(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_instruction.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "generation_result",
                    "schema": {
                        "type": "object",
                        "properties": { WRAPPER_FIELD: request.response_schema },
                        "required": [WRAPPER_FIELD]
                    }
                }
            }),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(endpoint = %self.endpoint(), "Sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.payload(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenaiError::MalformedEnvelope(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenaiError::EmptyResponse)?;

        Ok(unwrap_result(content.trim()))
    }
}

/// Extracts the wrapped value, passing anything else through for the caller
/// to validate.
fn unwrap_result(content: &str) -> String {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(mut map)) => match map.remove(WRAPPER_FIELD) {
            Some(inner) => inner.to_string(),
            None => content.to_string(),
        },
        _ => content.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
