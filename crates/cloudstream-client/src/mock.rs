//! In-memory object server for tests
//!
//! Authenticates every request with `SigV2Verifier`, stores PUT bodies in
//! a map and serves them back on GET. Requests are recorded so tests can
//! inspect what went over the wire.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use cloudstream_auth::{CredentialStore, SigV2Verifier};
use cloudstream_common::Credentials;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// What the server saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub date: Option<String>,
    pub authorization: Option<String>,
    pub content_length: Option<String>,
    pub transfer_encoding: Option<String>,
}

struct MockState {
    verifier: SigV2Verifier,
    objects: RwLock<HashMap<String, Bytes>>,
    requests: Mutex<Vec<SeenRequest>>,
    forced: Mutex<Option<(StatusCode, &'static str)>>,
    first_chunk: Arc<Notify>,
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start a server accepting requests signed with the given credentials
    pub async fn start(access_key_id: &str, secret: &str) -> Self {
        let store = Arc::new(CredentialStore::new());
        store.insert(Credentials::new(access_key_id, secret));

        let state = Arc::new(MockState {
            verifier: SigV2Verifier::new(store),
            objects: RwLock::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            forced: Mutex::new(None),
            first_chunk: Arc::new(Notify::new()),
        });

        let app = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every following request with a fixed status and body
    pub fn respond_with(&self, status: StatusCode, body: &'static str) {
        *self.state.forced.lock() = Some((status, body));
    }

    /// Notified when the first body chunk of an upload arrives
    pub fn first_chunk(&self) -> Arc<Notify> {
        Arc::clone(&self.state.first_chunk)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.requests.lock().clone()
    }

    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.state.objects.read().get(path).cloned()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn error_document(status: StatusCode, code: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>{code}</Code></Error>"
    );
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

async fn handle_request(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let headers = request.headers();
    state.requests.lock().push(SeenRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        date: header_string(headers, header::DATE),
        authorization: header_string(headers, header::AUTHORIZATION),
        content_length: header_string(headers, header::CONTENT_LENGTH),
        transfer_encoding: header_string(headers, header::TRANSFER_ENCODING),
    });

    let auth = state.verifier.verify(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Always drain the body so early responses never race the upload
    let body = match collect_body(request.into_body(), &state.first_chunk).await {
        Ok(body) => body,
        Err(status) => return status.into_response(),
    };

    if let Some((status, body)) = *state.forced.lock() {
        return (status, body).into_response();
    }
    if let Err(err) = auth {
        return error_document(StatusCode::FORBIDDEN, err.s3_error_code());
    }

    match method {
        Method::GET => match state.objects.read().get(&path) {
            Some(data) => (StatusCode::OK, data.clone()).into_response(),
            None => error_document(StatusCode::NOT_FOUND, "NoSuchKey"),
        },
        Method::PUT => {
            state.objects.write().insert(path, body);
            StatusCode::OK.into_response()
        }
        _ => error_document(StatusCode::METHOD_NOT_ALLOWED, "MethodNotAllowed"),
    }
}

async fn collect_body(body: Body, first_chunk: &Notify) -> Result<Bytes, StatusCode> {
    let mut stream = body.into_data_stream();
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|_| StatusCode::BAD_REQUEST)?;
        if data.is_empty() && !chunk.is_empty() {
            first_chunk.notify_one();
        }
        data.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(data))
}
