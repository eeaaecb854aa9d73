//! Math Adventure Land text-generation clients
//!
//! Thin clients for hosted generative-AI services that turn a structured
//! instruction (system role + user prompt + JSON schema) into JSON text.
//!
//! This crate owns transport, authentication, and envelope parsing only. It
//! knows nothing about math problems: callers build a [`GenerationRequest`]
//! and validate whatever text comes back.
//!
//! # Providers
//!
//! - [`GeminiClient`] - Google Gemini `generateContent` endpoint
//! - [`OpenAiClient`] - any OpenAI-compatible `chat/completions` endpoint

mod gemini;
mod openai;

pub use gemini::{to_gemini_schema, GeminiClient, GEMINI_DEFAULT_BASE_URL};
pub use openai::{OpenAiClient, OPENAI_DEFAULT_BASE_URL};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout applied by every client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while talking to a text-generation service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenaiError {
    /// The transport failed before a response was received.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The service answered successfully but produced no text.
    #[error("service returned an empty response")]
    EmptyResponse,

    /// The response envelope did not have the expected shape.
    #[error("unexpected response envelope: {0}")]
    MalformedEnvelope(String),

    /// The API key environment variable is unset or blank.
    #[error("API key not found in environment variable '{var}'")]
    MissingApiKey {
        /// Name of the environment variable that was checked.
        var: String,
    },
}

/// Categories of service errors for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Authentication failure (invalid API key, expired credentials).
    Authentication,
    /// Rate limit exceeded.
    RateLimit,
    /// Server error (5xx responses).
    Server,
    /// Network connectivity issues or timeouts.
    Network,
    /// Other unclassified errors.
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl ErrorKind {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            408 => Self::Network,
            429 => Self::RateLimit,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    /// Returns `true` if a request failing this way may succeed when retried.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::RateLimit | Self::Server | Self::Network)
    }
}

impl GenaiError {
    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) => {
                if let Some(status) = e.status() {
                    ErrorKind::from_status(status.as_u16())
                } else if e.is_timeout() || e.is_connect() || e.is_request() {
                    ErrorKind::Network
                } else {
                    ErrorKind::Other
                }
            }
            Self::HttpStatus { status, .. } => ErrorKind::from_status(*status),
            Self::MissingApiKey { .. } => ErrorKind::Authentication,
            Self::EmptyResponse | Self::MalformedEnvelope(_) => ErrorKind::Other,
        }
    }

    /// Returns `true` if this error is transient and may be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

/// Result type for text-generation operations.
pub type Result<T> = std::result::Result<T, GenaiError>;

/// A single structured generation request.
///
/// The schema uses the standard JSON-Schema vocabulary with lower-case type
/// names; each client converts it to its provider's dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System role instruction.
    pub system_instruction: String,
    /// User prompt.
    pub user_prompt: String,
    /// JSON schema the returned text must conform to.
    pub response_schema: serde_json::Value,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A hosted service that produces JSON text for a [`GenerationRequest`].
///
/// Implementations perform exactly one outbound call per
/// [`generate`](TextGenerator::generate) invocation and never retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Sends the request and returns the raw JSON text of the answer.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Reads an API key from the named environment variable.
///
/// # Errors
///
/// Returns [`GenaiError::MissingApiKey`] if the variable is unset or blank.
pub fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(GenaiError::MissingApiKey {
            var: var.to_string(),
        }),
    }
}

/// Builds the shared reqwest client used by every provider.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Turns a non-success response into [`GenaiError::HttpStatus`].
pub(crate) async fn status_error(response: reqwest::Response) -> GenaiError {
    const MAX_BODY: usize = 512;

    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_BODY {
        let mut cut = MAX_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    GenaiError::HttpStatus { status, body }
}
