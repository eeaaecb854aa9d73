//! Integration tests for problem generation over HTTP.
//!
//! A local axum server stands in for the Gemini and OpenAI APIs so the real
//! reqwest clients, the response envelope handling, and batch validation are
//! exercised together.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use mathland_game::{
    ClassLevel, FailureKind, GameConfig, GameMode, Operation, ProblemGenerator, RetryPolicy,
};
use mathland_genai::{ErrorKind, GeminiClient, OpenAiClient, DEFAULT_TIMEOUT};
use serde_json::json;

use common::{addition_batch, gemini_reply, openai_reply, spawn_mock, status_reply, MockService};

fn hunt() -> GameConfig {
    GameConfig::new(ClassLevel::P2, Operation::Addition, GameMode::TreasureHunt, 5)
}

fn gemini_generator(base_url: &str) -> ProblemGenerator {
    let client = GeminiClient::new("test-key", "gemini-2.5-flash", DEFAULT_TIMEOUT)
        .expect("Failed to build client")
        .with_base_url(base_url);
    ProblemGenerator::new(Box::new(client))
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_gemini_batch_is_normalized() {
    let service = MockService::new(vec![gemini_reply(&addition_batch().to_string())]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let problems = gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect("Generation should succeed");

    assert_eq!(problems.len(), 5);
    assert_eq!(problems[0].question, "4 + 5 = ?");
    assert_eq!(problems[1].question, "12 + 7 = ?");
    assert_eq!(problems[4].answer, 17);
    assert!(problems.iter().all(|p| p.options.is_none()));
}

#[tokio::test]
async fn test_gemini_request_shape() {
    let service = MockService::new(vec![gemini_reply(&addition_batch().to_string())]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect("Generation should succeed");

    let received = service.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(request.path, "/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    let system = request.body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .expect("system instruction text");
    assert!(system.contains("generate 5 age-appropriate math problems"));
    assert!(system.contains("Primary Level 2"));
    assert!(system.contains("strictly be about addition"));

    let config = &request.body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "ARRAY");
    assert_eq!(config["responseSchema"]["items"]["properties"]["answer"]["type"], "INTEGER");
    assert!(config["responseSchema"]["items"]["properties"]["options"].is_null());
}

#[tokio::test]
async fn test_openai_balloon_batch_keeps_options() {
    let batch = json!([
        { "question": "3 + 4", "answer": 7, "options": [7, 3, 9, 1] },
        { "question": "2 + 2", "answer": 4, "options": [5, 4, 6, 2] }
    ]);
    let service = MockService::new(vec![openai_reply(&batch)]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let client = OpenAiClient::new("test-key", "gpt-4o-mini", DEFAULT_TIMEOUT)
        .expect("Failed to build client")
        .with_base_url(&base_url);
    let config = GameConfig::new(ClassLevel::P2, Operation::Addition, GameMode::BalloonPop, 2);

    let problems = ProblemGenerator::new(Box::new(client))
        .generate(&config)
        .await
        .expect("Generation should succeed");

    assert_eq!(problems[0].options.as_deref(), Some(&[7, 3, 9, 1][..]));
    assert_eq!(problems[1].options.as_deref(), Some(&[5, 4, 6, 2][..]));

    let received = service.received();
    assert_eq!(received[0].path, "/chat/completions");
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(received[0].body["model"], "gpt-4o-mini");
    let schema = &received[0].body["response_format"]["json_schema"]["schema"];
    assert_eq!(schema["properties"]["result"]["items"]["required"], json!(["question", "answer", "options"]));
}

#[tokio::test]
async fn test_short_batch_is_rejected_whole() {
    let short = json!([
        { "question": "1 + 1", "answer": 2 },
        { "question": "2 + 1", "answer": 3 }
    ]);
    let service = MockService::new(vec![gemini_reply(&short.to_string())]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let err = gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect_err("A short batch must fail");

    assert_eq!(err.kind(), FailureKind::Count);
    assert_eq!(service.hits(), 1);
}

#[tokio::test]
async fn test_prose_reply_is_malformed() {
    let service = MockService::new(vec![gemini_reply("Sure! Here are some problems for you.")]);
    let (base_url, _server) = spawn_mock(service).await;

    let err = gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect_err("Prose must fail");

    assert_eq!(err.kind(), FailureKind::Malformed);
}

#[tokio::test]
async fn test_fenced_json_is_accepted() {
    let fenced = format!("```json\n{}\n```", addition_batch());
    let service = MockService::new(vec![gemini_reply(&fenced)]);
    let (base_url, _server) = spawn_mock(service).await;

    let problems = gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect("Fenced JSON should parse");

    assert_eq!(problems.len(), 5);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let service = MockService::new(vec![
        status_reply(StatusCode::SERVICE_UNAVAILABLE),
        gemini_reply(&addition_batch().to_string()),
    ]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let problems = gemini_generator(&base_url)
        .with_retry(fast_retry(2))
        .generate(&hunt())
        .await
        .expect("Second attempt should succeed");

    assert_eq!(problems.len(), 5);
    assert_eq!(service.hits(), 2);
}

#[tokio::test]
async fn test_single_attempt_by_default() {
    let service = MockService::new(vec![
        status_reply(StatusCode::SERVICE_UNAVAILABLE),
        gemini_reply(&addition_batch().to_string()),
    ]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let err = gemini_generator(&base_url)
        .generate(&hunt())
        .await
        .expect_err("Default policy does not retry");

    assert_eq!(err.kind(), FailureKind::Upstream(ErrorKind::Server));
    assert_eq!(service.hits(), 1);
}

#[tokio::test]
async fn test_bad_credentials_are_not_retried() {
    let service = MockService::new(vec![
        status_reply(StatusCode::UNAUTHORIZED),
        gemini_reply(&addition_batch().to_string()),
    ]);
    let (base_url, _server) = spawn_mock(service.clone()).await;

    let err = gemini_generator(&base_url)
        .with_retry(fast_retry(3))
        .generate(&hunt())
        .await
        .expect_err("Authentication failures are final");

    assert_eq!(err.kind(), FailureKind::Upstream(ErrorKind::Authentication));
    assert_eq!(service.hits(), 1);
}

#[tokio::test]
async fn test_invalid_config_never_reaches_service() {
    let service = MockService::new(Vec::new());
    let (base_url, _server) = spawn_mock(service.clone()).await;
    let race = GameConfig::new(ClassLevel::P1, Operation::Addition, GameMode::MathRace, 5);

    let err = gemini_generator(&base_url)
        .generate(&race)
        .await
        .expect_err("Placeholder modes cannot be generated for");

    assert_eq!(err.kind(), FailureKind::InvalidConfig);
    assert_eq!(service.hits(), 0);
}
