//! Loopback fakes for the device's discovery responder and HTTP API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use snapmaker_core::ClientConfig;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

pub const LOOPBACK: &str = "127.0.0.1";

pub fn reply_for(host: &str, model: &str, status: &str) -> Vec<u8> {
    format!("IP@{}|Model:{}|Status:{}", host, model, status).into_bytes()
}

/// Short timeouts, probes aimed at loopback.
pub fn test_config(discovery_port: u16, api_port: u16) -> ClientConfig {
    ClientConfig {
        discovery_port,
        broadcast_address: LOOPBACK.to_string(),
        receive_timeout: Duration::from_millis(200),
        discovery_retries: 5,
        discovery_retry_delay: Duration::from_millis(20),
        api_port,
        http_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_millis(200),
        reachability_retries: 2,
        reachability_backoff_base: Duration::from_millis(20),
    }
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((LOOPBACK, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

/// UDP responder that answers every `discover` probe with a fixed set of datagrams.
pub struct FakeDiscovery {
    pub port: u16,
    probes: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeDiscovery {
    pub async fn start(replies: Vec<Vec<u8>>) -> Self {
        let socket = UdpSocket::bind((LOOPBACK, 0)).await.unwrap();
        let port = socket.local_addr().unwrap().port();
        let probes = Arc::new(AtomicUsize::new(0));
        let counter = probes.clone();

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((len, from)) = socket.recv_from(&mut buf).await {
                if &buf[..len] != b"discover" {
                    continue;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                for reply in &replies {
                    let _ = socket.send_to(reply, from).await;
                }
            }
        });

        Self { port, probes, task }
    }

    /// A device that never answers.
    pub async fn silent() -> Self {
        Self::start(Vec::new()).await
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl Drop for FakeDiscovery {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, Default)]
pub struct ApiState {
    /// Token handed out on an empty connect; `None` makes connect answer "Failed".
    pub issue_token: Option<String>,
    /// Echoed on the validation POST instead of the posted token.
    pub echo_override: Option<String>,
    /// Token the status endpoint accepts; anything else gets a 401.
    pub accepted_token: Option<String>,
    /// Forces the status endpoint to answer with this code.
    pub status_override: Option<StatusCode>,
    pub status_body: String,
    pub connect_bodies: Vec<String>,
    /// Request targets (`path?query`) seen by the status endpoint.
    pub status_requests: Vec<String>,
}

type SharedState = Arc<Mutex<ApiState>>;

/// Axum server emulating `/api/v1/connect` and `/api/v1/status`.
pub struct FakeApi {
    pub port: u16,
    pub state: SharedState,
    task: JoinHandle<()>,
}

impl FakeApi {
    pub async fn start(token: &str, status_body: serde_json::Value) -> Self {
        Self::with_state(ApiState {
            issue_token: Some(token.to_string()),
            accepted_token: Some(token.to_string()),
            status_body: status_body.to_string(),
            ..ApiState::default()
        })
        .await
    }

    pub async fn with_state(state: ApiState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/api/v1/connect", post(connect))
            .route("/api/v1/status", get(status))
            .with_state(state.clone());

        let listener = TcpListener::bind((LOOPBACK, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { port, state, task }
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().unwrap().connect_bodies.len()
    }

    pub fn status_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().status_requests.clone()
    }

    pub fn total_requests(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.connect_bodies.len() + state.status_requests.len()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn connect(State(state): State<SharedState>, body: String) -> Response {
    let mut state = state.lock().unwrap();
    state.connect_bodies.push(body.clone());

    if state.issue_token.is_none() {
        return (StatusCode::OK, "Failed to connect: request was not approved").into_response();
    }

    match body.strip_prefix("token=") {
        Some(echo) => {
            let echo = state.echo_override.clone().unwrap_or_else(|| echo.to_string());
            Json(json!({ "token": echo })).into_response()
        }
        None => Json(json!({ "token": state.issue_token })).into_response(),
    }
}

async fn status(
    State(state): State<SharedState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.status_requests.push(uri.to_string());

    if let Some(code) = state.status_override {
        return (code, "internal error").into_response();
    }
    if params.get("token") != state.accepted_token.as_ref() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    (StatusCode::OK, state.status_body.clone()).into_response()
}
