use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bird_auth::{AuthApp, AuthConfig, HistoryNavigator, Navigator, Route};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Value,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process backend on an ephemeral port that records every request it receives.
pub struct MockBackend {
    base_url: String,
    state: Arc<MockState>,
    _shutdown: oneshot::Sender<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            _shutdown: shutdown_tx,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn respond(&self, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

    let configured = state.routes.lock().expect("routes lock").get(&path).cloned();
    let Some(response) = configured else {
        return (StatusCode::NOT_FOUND, axum::Json(serde_json::json!({"message": "not found"})))
            .into_response();
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }
    let status = StatusCode::from_u16(response.status).expect("valid status");
    (status, axum::Json(response.body)).into_response()
}

/// Base URL of a port nothing listens on.
#[allow(dead_code)]
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub struct Harness {
    pub app: AuthApp,
    pub nav: Arc<HistoryNavigator>,
    pub data_dir: TempDir,
}

impl Harness {
    pub fn new(api_base_url: &str, initial: Route) -> Self {
        let data_dir = tempfile::tempdir().expect("tempdir");
        Self::in_dir(api_base_url, initial, data_dir)
    }

    /// Reopen a client over an existing data dir, like a page reload.
    pub fn in_dir(api_base_url: &str, initial: Route, data_dir: TempDir) -> Self {
        let config = AuthConfig {
            api_base_url: api_base_url.to_string(),
            github_client_id: "Iv1.testclient".to_string(),
            app_origin: "http://localhost:5173".to_string(),
            data_dir: Some(data_dir.path().to_path_buf()),
            request_timeout_secs: 5,
        };
        let nav = Arc::new(HistoryNavigator::new(initial));
        let navigator: Arc<dyn Navigator> = nav.clone();
        let app = AuthApp::init(config, navigator).expect("init auth app");
        Self { app, nav, data_dir }
    }

    pub fn token(&self) -> Option<String> {
        self.app.session_store().get()
    }

    #[allow(dead_code)]
    pub fn seed_token(&self, token: &str) {
        self.app.session_store().set(token).expect("seed token");
    }
}
