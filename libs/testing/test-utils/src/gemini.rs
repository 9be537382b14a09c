//! Fake Gemini embeddings API
//!
//! Serves `models/{model}:embedContent` and `models/{model}:batchEmbedContents`
//! on a loopback port with deterministic embeddings derived from the text.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const FAKE_GEMINI_API_KEY: &str = "test-gemini-key";

/// Same per-call limit as the real batchEmbedContents
const MAX_BATCH_REQUESTS: usize = 100;

/// Deterministic embedding: byte values folded into `dimensions` buckets
pub fn fake_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % dimensions] += f32::from(byte) / 255.0;
    }
    vector
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Normal,
    DropLast,
    Fail(StatusCode),
}

struct GeminiState {
    dimensions: usize,
    behavior: Mutex<Behavior>,
    requests: AtomicUsize,
}

/// A fake embeddings endpoint; stops when dropped
pub struct FakeGemini {
    state: Arc<GeminiState>,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeGemini {
    pub async fn start(dimensions: usize) -> Self {
        assert!(dimensions > 0, "fake embeddings need at least one dimension");

        let state = Arc::new(GeminiState {
            dimensions,
            behavior: Mutex::new(Behavior::Normal),
            requests: AtomicUsize::new(0),
        });
        let router = Router::new()
            .route("/models/{call}", post(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake Gemini address");

        let (shutdown, signal) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let result = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    signal.await.ok();
                })
                .await;
            if let Err(err) = result {
                tracing::error!(error = %err, "Fake Gemini server failed");
            }
        });

        Self {
            state,
            addr,
            shutdown: Some(shutdown),
        }
    }

    /// Base URL to hand to the embedding provider
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_key(&self) -> &'static str {
        FAKE_GEMINI_API_KEY
    }

    /// Requests received so far, including rejected ones
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Batch responses omit their last embedding from now on
    pub fn drop_last_embedding(&self) {
        self.set_behavior(Behavior::DropLast);
    }

    /// Every request fails with HTTP `status` from now on
    pub fn fail_with(&self, status: u16) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.set_behavior(Behavior::Fail(status));
    }

    fn set_behavior(&self, behavior: Behavior) {
        *self
            .state
            .behavior
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = behavior;
    }
}

impl Drop for FakeGemini {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message}})),
    )
        .into_response()
}

fn text_of(request: &Value) -> Option<&str> {
    request["content"]["parts"][0]["text"].as_str()
}

async fn handle(
    State(state): State<Arc<GeminiState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let behavior = *state
        .behavior
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Behavior::Fail(status) = behavior {
        return error(status, "injected failure");
    }

    let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
    if key != Some(FAKE_GEMINI_API_KEY) {
        return error(StatusCode::UNAUTHORIZED, "API key not valid");
    }

    let Some((_model, method)) = call.split_once(':') else {
        return error(StatusCode::NOT_FOUND, "unknown method");
    };

    match method {
        "embedContent" => match text_of(&body) {
            Some(text) => Json(json!({
                "embedding": {"values": fake_embedding(text, state.dimensions)}
            }))
            .into_response(),
            None => error(StatusCode::BAD_REQUEST, "content.parts[0].text is required"),
        },
        "batchEmbedContents" => {
            let Some(requests) = body["requests"].as_array() else {
                return error(StatusCode::BAD_REQUEST, "requests is required");
            };
            if requests.len() > MAX_BATCH_REQUESTS {
                return error(
                    StatusCode::BAD_REQUEST,
                    "at most 100 requests can be in one batch",
                );
            }
            let mut embeddings = Vec::with_capacity(requests.len());
            for request in requests {
                let Some(text) = text_of(request) else {
                    return error(StatusCode::BAD_REQUEST, "content.parts[0].text is required");
                };
                embeddings.push(json!({"values": fake_embedding(text, state.dimensions)}));
            }
            if behavior == Behavior::DropLast {
                embeddings.pop();
            }
            Json(json!({"embeddings": embeddings})).into_response()
        }
        _ => error(StatusCode::NOT_FOUND, "unknown method"),
    }
}
