//! Test utilities for nightguard-client
//!
//! [`MockVehicleApi`] serves canned envelopes from an in-process axum server
//! and records every request it receives, so tests can assert on the exact
//! paths and headers the client sends.
//!
//! ```rust,ignore
//! use nightguard_client::testing::{MockVehicleApi, TestServer};
//!
//! let api = MockVehicleApi::new("/connected-vehicle/v1/vehicles")
//!     .vehicles(&["YV4952NA4F120DEMO"]);
//! let server = TestServer::start(api.router()).await?;
//! let config = ServiceConfig::builder(api.service_uri(&server.base_url())).build();
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::Result;

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve an axum Router on an ephemeral local port
    pub async fn start(router: axum::Router) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A request seen by [`MockVehicleApi`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the mock's base path
    pub path: String,
    /// Header names are lower case
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    http_status: u16,
    body: Value,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<(String, String), CannedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the connected-vehicle API.
///
/// Requests without a canned response get a 404 envelope.
#[derive(Clone)]
pub struct MockVehicleApi {
    base_path: String,
    state: Arc<MockState>,
}

impl MockVehicleApi {
    /// Create a mock serving below `base_path` (e.g. `/connected-vehicle/v1/vehicles`)
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            state: Arc::new(MockState::default()),
        }
    }

    /// Base URI to put in the service configuration
    pub fn service_uri(&self, server_base_url: &str) -> String {
        format!("{}{}", server_base_url, self.base_path)
    }

    /// Answer `method path` with a raw HTTP status and body
    pub fn respond(self, method: &str, path: &str, http_status: u16, body: Value) -> Self {
        self.state.responses.lock().insert(
            (method.to_ascii_uppercase(), path.to_string()),
            CannedResponse { http_status, body },
        );
        self
    }

    /// Serve the vehicle list at `/`
    pub fn vehicles(self, vins: &[&str]) -> Self {
        let data: Vec<Value> = vins.iter().map(|vin| json!({ "vin": vin })).collect();
        self.ok("GET", "/", Value::Array(data))
    }

    /// Serve a 200 envelope with `data`
    pub fn ok(self, method: &str, path: &str, data: Value) -> Self {
        self.respond(method, path, 200, json!({ "status": 200, "data": data }))
    }

    /// Serve a 202 envelope carrying `operation_id`
    pub fn accepted(self, method: &str, path: &str, operation_id: &str) -> Self {
        let body = json!({
            "status": 202,
            "operationId": operation_id,
            "error": { "message": "Accepted", "description": "Request accepted for processing" },
            "data": {}
        });
        self.respond(method, path, 202, body)
    }

    /// Serve an error envelope; the HTTP status matches the embedded one
    pub fn fail(self, method: &str, path: &str, status: u16, description: &str) -> Self {
        let body = json!({
            "status": status,
            "error": { "message": "Error", "description": description },
            "data": null
        });
        self.respond(method, path, status, body)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Build the axum router serving this mock
    pub fn router(&self) -> axum::Router {
        axum::Router::new()
            .fallback(handle_request)
            .with_state(self.clone())
    }
}

async fn handle_request(
    State(api): State<MockVehicleApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let full_path = uri.path();
    let path = full_path
        .strip_prefix(api.base_path.as_str())
        .unwrap_or(full_path);
    let path = if path.is_empty() { "/" } else { path };

    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    api.state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        path: path.to_string(),
        headers,
    });

    let canned = api
        .state
        .responses
        .lock()
        .get(&(method.to_string(), path.to_string()))
        .cloned();

    match canned {
        Some(canned) => (
            StatusCode::from_u16(canned.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(canned.body),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": 404,
                "error": { "message": "Not Found", "description": format!("No resource at {}", path) },
                "data": null
            })),
        ),
    }
}
