//! Scripted mock of the remote service for integration tests.
//!
//! Responses are enqueued ahead of time and served in order to whatever
//! request arrives next; every request is captured for wire-level
//! assertions.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }

    /// The `action` field of the JSON envelope, if any.
    pub fn action(&self) -> Option<String> {
        let body = self.json();
        body.get("action")
            .and_then(|action| action.as_str())
            .map(str::to_string)
    }
}

/// A scripted response to return.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: br#"{"ok": true}"#.to_vec(),
        }
    }
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn error(status: u16) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: br#"{"error": "rejected"}"#.to_vec(),
        }
    }

    pub fn bytes(content: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                "application/octet-stream".to_string(),
            )],
            body: content.to_vec(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// A `login` response issuing a token and a session cookie.
    pub fn login_ok(token: &str, session_id: &str) -> Self {
        Self::json(&format!(r#"{{"csrftoken": "{token}"}}"#)).with_header(
            "set-cookie",
            &format!("__Host-XASSESSIONID={session_id}; Path=/; Secure; HttpOnly"),
        )
    }

    /// A `get_session_data` response for the given user and catalogue.
    pub fn session_data(token: &str, user_name: &str, classes: &[&str]) -> Self {
        let metadata: Vec<serde_json::Value> = classes
            .iter()
            .map(|class| serde_json::json!({"objectType": class}))
            .collect();
        let body = serde_json::json!({
            "csrftoken": token,
            "user": {
                "objectType": "System.User",
                "guid": "281474976710657",
                "attributes": {"Name": {"value": user_name, "readonly": true}}
            },
            "metadata": metadata,
        });
        Self::json(&body.to_string())
    }

    /// An object-bearing response (`objects: [...]`).
    pub fn objects(objects: &[serde_json::Value]) -> Self {
        Self::json(&serde_json::json!({"objects": objects}).to_string())
    }
}

/// Build one object literal for [`MockResponse::objects`].
pub fn object(class: &str, guid: &str, attributes: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"objectType": class, "guid": guid, "attributes": attributes})
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

/// Mock service endpoint for testing.
pub struct MockService {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockService {
    pub async fn start() -> Self {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
        };

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/{*path}", any(handle_request))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        // Wait for the server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Enqueue a response for the next request.
    pub async fn enqueue(&self, response: MockResponse) {
        self.state.responses.lock().await.push_back(response);
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.state.requests.lock().await.len()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn clear(&self) {
        self.state.requests.lock().await.clear();
        self.state.responses.lock().await.clear();
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn handle_request(State(state): State<MockState>, req: Request<Body>) -> Response<Body> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_str().unwrap_or("").to_string()))
        .collect();

    let body = axum::body::to_bytes(req.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default()
        .to_vec();

    state.requests.lock().await.push(CapturedRequest {
        method,
        path,
        query,
        headers,
        body,
    });

    let mock = state.responses.lock().await.pop_front().unwrap_or_default();

    let mut builder = Response::builder().status(StatusCode::from_u16(mock.status).unwrap());
    for (name, value) in mock.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(mock.body)).unwrap()
}
