//! Problem Generator.
//!
//! Turns a [`GameConfig`] into exactly `rounds` validated problems by asking
//! a [`TextGenerator`] for one JSON batch. A batch is accepted whole or not
//! at all.

use std::time::Duration;

use mathland_genai::{GenerationRequest, TextGenerator};
use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::GameConfig;
use crate::config::Settings;
use crate::error::{FailureKind, GenerationError};
use crate::problem::{normalize_question, Problem, QUESTION_SUFFIX};
use crate::prompt;

/// How many times a batch is requested before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each further one.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Produces batches of problems through an external text-generation service.
pub struct ProblemGenerator {
    backend: Box<dyn TextGenerator>,
    temperature: f32,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ProblemGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProblemGenerator")
            .field("backend", &self.backend.name())
            .field("temperature", &self.temperature)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProblemGenerator {
    /// Creates a generator with a single attempt and the default temperature.
    #[must_use]
    pub fn new(backend: Box<dyn TextGenerator>) -> Self {
        Self {
            backend,
            temperature: 0.8,
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a generator configured from settings.
    #[must_use]
    pub fn from_settings(backend: Box<dyn TextGenerator>, settings: &Settings) -> Self {
        Self::new(backend)
            .with_temperature(settings.temperature)
            .with_retry(RetryPolicy {
                max_attempts: settings.max_attempts.max(1),
                initial_backoff: settings.retry_backoff(),
            })
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generates exactly `config.rounds` problems.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the configuration is unusable, the
    /// service fails, or no attempt yields a fully valid batch.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn generate(&self, config: &GameConfig) -> Result<Vec<Problem>, GenerationError> {
        config
            .validate()
            .map_err(|e| GenerationError::new(FailureKind::InvalidConfig, e.to_string()))?;

        let request = prompt::build_request(config, self.temperature);
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 1;

        loop {
            match self.attempt(&request, config).await {
                Ok(problems) => {
                    info!(attempt, count = problems.len(), "Generated problem batch");
                    return Ok(problems);
                }
                Err(err) if attempt < self.retry.max_attempts && err.is_retryable() => {
                    warn!(
                        attempt,
                        kind = %err.kind(),
                        detail = err.detail(),
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        "Generation attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempt, kind = %err.kind(), detail = err.detail(), "Problem generation failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        config: &GameConfig,
    ) -> Result<Vec<Problem>, GenerationError> {
        let text = self.backend.generate(request).await?;
        debug!(bytes = text.len(), "Received generation response");
        parse_batch(&text, config)
    }
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    question: String,
    answer: Number,
    #[serde(default)]
    options: Option<Vec<Number>>,
}

/// Parses and validates one response into a batch for `config`.
///
/// # Errors
///
/// Returns a [`GenerationError`] describing the first violation found:
/// non-JSON text, schema mismatches, non-integer numbers, a wrong batch
/// length, empty questions, or unusable options.
pub fn parse_batch(text: &str, config: &GameConfig) -> Result<Vec<Problem>, GenerationError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::malformed(format!("response is not JSON: {e}")))?;
    let raw: Vec<RawProblem> = serde_json::from_value(value)
        .map_err(|e| GenerationError::schema(format!("response does not match schema: {e}")))?;

    let expected = usize::try_from(config.rounds).unwrap_or(usize::MAX);
    if raw.len() != expected {
        return Err(GenerationError::new(
            FailureKind::Count,
            format!("expected {expected} problems, got {}", raw.len()),
        ));
    }

    let needs_options = config.needs_options();
    let problems = raw
        .into_iter()
        .enumerate()
        .map(|(index, raw)| to_problem(index, raw, needs_options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(problems)
}

fn to_problem(index: usize, raw: RawProblem, needs_options: bool) -> Result<Problem, GenerationError> {
    let answer = as_integer(&raw.answer).ok_or_else(|| {
        GenerationError::schema(format!("problem {index}: answer {} is not an integer", raw.answer))
    })?;

    let question = normalize_question(&raw.question);
    if question
        .strip_suffix(QUESTION_SUFFIX)
        .map_or(true, |stem| stem.trim().is_empty())
    {
        return Err(GenerationError::schema(format!("problem {index}: question is empty")));
    }

    let mut problem = Problem {
        question,
        answer,
        options: None,
    };

    if needs_options {
        let options = raw
            .options
            .unwrap_or_default()
            .iter()
            .map(|n| {
                as_integer(n).ok_or_else(|| {
                    GenerationError::schema(format!("problem {index}: option {n} is not an integer"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        problem = problem.with_options(options);
        problem.validate_options()?;
    }

    Ok(problem)
}

/// Reads a JSON number as an integer, accepting whole floats such as `12.0`.
#[allow(clippy::cast_possible_truncation)]
fn as_integer(number: &Number) -> Option<i64> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT)
            .map(|f| f as i64)
    })
}

/// Removes a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
