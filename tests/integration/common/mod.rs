//! Scripted stand-ins for the Gemini and OpenAI HTTP APIs.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

/// One request as the mock service saw it.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Replies handed out in order, plus every request received.
#[derive(Default)]
pub struct MockService {
    replies: Mutex<VecDeque<(StatusCode, Value)>>,
    received: Mutex<Vec<Received>>,
}

impl MockService {
    pub fn new(replies: Vec<(StatusCode, Value)>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().expect("lock poisoned").clone()
    }

    pub fn hits(&self) -> usize {
        self.received.lock().expect("lock poisoned").len()
    }

    fn record(&self, path: &str, headers: &HeaderMap, body: Value) -> (StatusCode, Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.received.lock().expect("lock poisoned").push(Received {
            path: path.to_string(),
            api_key: header("x-goog-api-key"),
            authorization: header("authorization"),
            body,
        });
        self.replies
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "no scripted reply left" }),
                )
            })
    }
}

async fn gemini(
    State(service): State<Arc<MockService>>,
    axum::extract::Path(call): axum::extract::Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (status, reply) = service.record(&format!("/v1beta/models/{call}"), &headers, body);
    (status, Json(reply))
}

async fn openai(
    State(service): State<Arc<MockService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (status, reply) = service.record("/chat/completions", &headers, body);
    (status, Json(reply))
}

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Spawns the mock service and returns its base URL.
pub async fn spawn_mock(service: Arc<MockService>) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let router = Router::new()
        .route("/v1beta/models/:call", post(gemini))
        .route("/chat/completions", post(openai))
        .with_state(service);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{addr}"), handle)
}

/// Wraps generated text in a `generateContent` response.
pub fn gemini_reply(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": text }] } }
            ]
        }),
    )
}

/// Wraps generated JSON in a chat completion with the `result` wrapper.
pub fn openai_reply(result: &Value) -> (StatusCode, Value) {
    let content = json!({ "result": result }).to_string();
    (
        StatusCode::OK,
        json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        }),
    )
}

/// An error status with a JSON body.
pub fn status_reply(status: StatusCode) -> (StatusCode, Value) {
    (status, json!({ "error": { "code": status.as_u16() } }))
}

/// Five addition problems as a service would return them.
pub fn addition_batch() -> Value {
    json!([
        { "question": "4 + 5", "answer": 9 },
        { "question": "12 + 7 = ?", "answer": 19 },
        { "question": "8 + 8", "answer": 16 },
        { "question": "20 + 3", "answer": 23 },
        { "question": "6 + 11", "answer": 17 }
    ])
}
