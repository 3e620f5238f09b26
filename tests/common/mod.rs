//! Shared utilities for integration testing.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A request received by a mock signer.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub body: Value,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

type Respond = Box<dyn Fn(&Value) -> (u16, Value) + Send + Sync>;

struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    respond: Respond,
}

/// Handle to a running mock signer service.
pub struct MockSigner {
    pub addr: SocketAddr,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockSigner {
    /// Base URL to register with, mirroring the core's `/mockhsm` mount.
    pub fn url(&self) -> String {
        format!("http://{}/mockhsm", self.addr)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Start a programmable mock signer on an ephemeral port.
pub async fn start_mock_signer<F>(respond: F) -> MockSigner
where
    F: Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(MockState {
        calls: calls.clone(),
        respond: Box::new(respond),
    });

    let app = Router::new()
        .route("/mockhsm/sign-transaction", post(sign_transaction))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockSigner { addr, calls }
}

async fn sign_transaction(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    state.calls.lock().unwrap().push(RecordedCall {
        body: body.clone(),
        authorization: header("authorization"),
        request_id: header("x-request-id"),
    });

    let (status, response) = (state.respond)(&body);
    (StatusCode::from_u16(status).unwrap(), Json(response))
}

/// Sign every submitted transaction by appending `name` to `signed_by`.
pub fn stamp_all(body: &Value, name: &str) -> Value {
    let signed: Vec<Value> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| stamp(t, name))
        .collect();
    Value::Array(signed)
}

pub fn stamp(transaction: &Value, name: &str) -> Value {
    let mut t = transaction.clone();
    let signed_by = t
        .as_object_mut()
        .unwrap()
        .entry("signed_by")
        .or_insert_with(|| json!([]));
    signed_by.as_array_mut().unwrap().push(json!(name));
    t
}
