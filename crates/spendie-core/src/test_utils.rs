//! Test utilities for spendie-core
//!
//! A mock OpenAI-compatible inference server for exercising the HTTP backend
//! end to end. Requests are routed to a stage by a marker phrase in the system
//! prompt, so the embedded prompt files drive it without extra wiring.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// System prompt marker -> stage (prompt id)
const STAGE_MARKERS: &[(&str, &str)] = &[
    ("standardization expert", "rephrase"),
    ("message type classifier", "classify_message"),
    ("expert transaction parser", "extract_transaction"),
    ("query parser", "extract_query"),
    ("UPI transaction parser", "parse_screenshot"),
];

/// Which stage a system prompt belongs to
pub fn stage_of(system_prompt: &str) -> Option<&'static str> {
    STAGE_MARKERS
        .iter()
        .find(|(marker, _)| system_prompt.contains(marker))
        .map(|(_, stage)| *stage)
}

struct ServerState {
    replies: HashMap<String, String>,
    fail_status: Option<StatusCode>,
    requests: Mutex<Vec<Value>>,
}

/// Mock OpenAI-compatible server for testing and development
pub struct MockInferenceServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockInferenceServer {
    /// Start with canned replies for every stage
    pub async fn start() -> Self {
        Self::start_scripted(HashMap::new()).await
    }

    /// Start with per-stage replies; unscripted stages use the canned ones
    pub async fn start_scripted(replies: HashMap<String, String>) -> Self {
        Self::spawn(ServerState {
            replies,
            fail_status: None,
            requests: Mutex::new(Vec::new()),
        })
        .await
    }

    /// Start a server whose completions endpoint always answers `status`
    pub async fn start_failing(status: StatusCode) -> Self {
        Self::spawn(ServerState {
            replies: HashMap::new(),
            fail_status: Some(status),
            requests: Mutex::new(Vec::new()),
        })
        .await
    }

    async fn spawn(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Raw JSON bodies received on the completions endpoint
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockInferenceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model", "owned_by": "spendie"}]
    }))
}

async fn handle_chat(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body.clone());

    if let Some(status) = state.fail_status {
        return (status, Json(json!({"error": {"message": "mock failure"}}))).into_response();
    }

    let (system, user) = message_texts(&body);
    let content = match stage_of(&system) {
        Some(stage) => state
            .replies
            .get(stage)
            .cloned()
            .unwrap_or_else(|| canned_reply(stage, &user)),
        None => String::new(),
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// System and user text; image parts are skipped
fn message_texts(body: &Value) -> (String, String) {
    let mut system = String::new();
    let mut user = String::new();
    for message in body["messages"].as_array().into_iter().flatten() {
        let text = match &message["content"] {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        };
        match message["role"].as_str() {
            Some("system") => system = text,
            Some("user") => user = text,
            _ => {}
        }
    }
    (system, user)
}

fn canned_reply(stage: &str, user: &str) -> String {
    match stage {
        "rephrase" => user.trim().to_string(),
        "classify_message" => "transaction".to_string(),
        "extract_transaction" => json!({
            "type": "expense",
            "amount": 250,
            "description": "groceries",
            "category": "food",
            "confidence": "high",
            "recipient_sender": null,
            "split_info": null
        })
        .to_string(),
        "extract_query" => json!({
            "intent": "list",
            "type": "both",
            "confidence": "medium"
        })
        .to_string(),
        "parse_screenshot" => json!({
            "amount": 500,
            "type": "expense",
            "recipient_sender": "Rahul Sharma",
            "app_name": "PhonePe",
            "transaction_id": "T2406131234",
            "description": "UPI payment",
            "category": "transfer",
            "confidence": "high"
        })
        .to_string(),
        _ => String::new(),
    }
}
