#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use flashquiz_api::{config::Config, create_router, services::AppState};

/// Canned reply served by [`MockGateway`] for one path.
#[derive(Clone)]
pub enum MockReply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

/// A request the gateway saw.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct GatewayState {
    replies: Arc<HashMap<String, MockReply>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Stand-in for the chat-completion gateway, bound on an ephemeral port.
/// Paths without a configured reply answer 404.
pub struct MockGateway {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockGateway {
    pub async fn start(replies: Vec<(&str, MockReply)>) -> Self {
        let state = GatewayState {
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(path, reply)| (path.to_string(), reply))
                    .collect(),
            ),
            hits: Arc::new(Mutex::new(Vec::new())),
        };
        let hits = state.hits.clone();

        let app = Router::new().fallback(record_and_reply).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock gateway");
        let addr = listener.local_addr().expect("Mock gateway has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_paths(&self) -> Vec<String> {
        self.hits().into_iter().map(|hit| hit.path).collect()
    }
}

async fn record_and_reply(State(state): State<GatewayState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    state.hits.lock().unwrap().push(Hit {
        path: path.clone(),
        authorization,
        body,
    });

    match state.replies.get(&path) {
        Some(MockReply::Json(status, value)) => (*status, axum::Json(value.clone())).into_response(),
        Some(MockReply::Text(status, text)) => (*status, text.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Base URL of a port nothing listens on.
pub async fn unused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Probe port has no address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.llm.api_key = "sk-test-0123456789abcdef".to_string();
    config.llm.base_url = base_url.to_string();
    config.llm.request_timeout_secs = 5;
    config.environment = "test".to_string();
    config
}

pub fn create_test_app(config: Config) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    create_router(Arc::new(AppState::new(config)))
}

/// Chat-completion envelope carrying `content` as the assistant message.
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

/// Serialized `{"questions": [...]}` payload with `count` valid questions.
pub fn questions_payload(count: usize) -> String {
    let questions: Vec<Value> = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "question": format!("Photosynthesis question {}?", id),
                "options": ["Light", "Water", "Carbon dioxide", "Oxygen"],
                "correctAnswer": id % 4,
                "explanation": format!("Explanation {}", id)
            })
        })
        .collect();
    json!({ "questions": questions }).to_string()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
