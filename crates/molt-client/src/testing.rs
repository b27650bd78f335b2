//! In-process fake of the molt-md API for tests.
//!
//! Serves scripted replies keyed by method and path on an ephemeral port and
//! records every request it sees. Unscripted routes answer 501.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::config::ClientConfig;

/// Path prefix the fake mounts the API under, mirroring the public base URL.
const API_PREFIX: &str = "/api/v1";

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn markdown(status: u16, text: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "text/markdown".into())],
            body: text.as_bytes().to_vec(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// What the fake received, with the `/api/v1` prefix stripped from `path`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, `Value::Null` when it isn't.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct FakeState {
    routes: HashMap<(Method, String), Reply>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeApi {
    addr: SocketAddr,
    state: Shared,
    task: tokio::task::AbortHandle,
}

impl FakeApi {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API listener");
        let addr = listener.local_addr().expect("fake API local addr");

        let state = Shared::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("fake API stopped: {e}");
            }
        });

        Self {
            addr,
            state,
            task: task.abort_handle(),
        }
    }

    /// A base URL nothing is listening on, for transport failures.
    pub async fn unreachable_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("probe local addr");
        drop(listener);
        format!("http://{addr}{API_PREFIX}")
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client config pointed at this fake.
    pub fn config(&self, api_key: &str) -> ClientConfig {
        ClientConfig::new(api_key).with_base_url(self.base_url())
    }

    /// Script the reply for `method path` (path relative to the API root).
    pub fn on(&self, method: Method, path: &str, reply: Reply) {
        self.lock().routes.insert((method, path.to_string()), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake API state poisoned")
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    let reply = {
        let mut state = state.lock().expect("fake API state poisoned");
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            headers,
            body,
        });
        state.routes.get(&(method, path)).cloned()
    };

    match reply {
        Some(reply) => reply.into_response(),
        None => (StatusCode::NOT_IMPLEMENTED, "no scripted reply").into_response(),
    }
}
