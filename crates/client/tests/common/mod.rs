//! Shared harness for client integration tests: an in-process fake of the
//! marketplace backend served by axum on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use bazaar_client::{ApiClient, ClientConfig, LoginNavigator, MemoryTokenStore, TokenStore};
use bazaar_core::types::{AuthUser, Session};

/// One request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Knobs and recordings of the fake backend.
pub struct Backend {
    /// The only access token protected routes accept.
    pub valid_token: Mutex<String>,
    /// Refresh token the exchange accepts.
    pub refresh_token: String,
    /// Access token handed out by a successful exchange.
    pub issued_token: String,
    /// Refresh token included in the exchange response, if any.
    pub rotated_refresh_token: Option<String>,
    /// Status the exchange answers with when the refresh token matches.
    pub refresh_status: StatusCode,
    /// Delay before the exchange answers, so concurrent 401s overlap it.
    pub refresh_delay: Duration,
    /// Protected routes answer 401 regardless of token.
    pub always_unauthorized: bool,

    pub refresh_calls: AtomicUsize,
    pub refresh_bodies: Mutex<Vec<Value>>,
    pub seen: Mutex<Vec<Seen>>,
    pub multipart_fields: Mutex<Vec<Vec<String>>>,
    /// `(name, value)` of every non-file multipart field accepted.
    pub multipart_text: Mutex<Vec<(String, String)>>,
    pub ask_queries: Mutex<Vec<Value>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            valid_token: Mutex::new("new-token-123".into()),
            refresh_token: "refresh-xyz".into(),
            issued_token: "new-token-123".into(),
            rotated_refresh_token: None,
            refresh_status: StatusCode::OK,
            refresh_delay: Duration::from_millis(150),
            always_unauthorized: false,
            refresh_calls: AtomicUsize::new(0),
            refresh_bodies: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
            multipart_fields: Mutex::new(Vec::new()),
            multipart_text: Mutex::new(Vec::new()),
            ask_queries: Mutex::new(Vec::new()),
        }
    }
}

impl Backend {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Requests to `path` (relative to `/api/v1`), in arrival order.
    pub fn seen_at(&self, path: &str) -> Vec<Seen> {
        let full = format!("/api/v1{path}");
        self.seen().into_iter().filter(|s| s.path == full).collect()
    }

    fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Option<String> {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.seen.lock().unwrap().push(Seen {
            method: method.clone(),
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            authorization: authorization.clone(),
        });
        authorization
    }

    fn is_authorized(&self, authorization: Option<&str>) -> bool {
        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        !self.always_unauthorized && authorization == Some(expected.as_str())
    }
}

/// A running fake backend.
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
}

impl TestServer {
    pub async fn start(backend: Backend) -> Self {
        let backend = Arc::new(backend);
        let app = Router::new()
            .route("/api/v1/auth/refresh", post(refresh))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/item/add", post(listing_upload))
            .route("/api/v1/item/update/{id}", put(listing_upload))
            .route("/api/v1/ask/search", post(ask_search))
            .fallback(protected)
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self { addr, backend }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url())
    }
}

/// Counts login redirects.
#[derive(Default)]
pub struct CountingNavigator {
    pub redirects: AtomicUsize,
    pub last_path: Mutex<Option<String>>,
}

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl LoginNavigator for CountingNavigator {
    fn navigate_to_login(&self, login_path: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(login_path.to_owned());
    }
}

pub fn user() -> AuthUser {
    AuthUser {
        email: "seller@example.lk".into(),
        roles: vec!["USER".into(), "ADMIN".into()],
    }
}

/// A store holding `access_token`, optionally `refresh_token`, and a user.
pub fn store_with(access_token: &str, refresh_token: Option<&str>) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_session(Session {
        access_token: Some(access_token.into()),
        refresh_token: refresh_token.map(str::to_owned),
        user: Some(user()),
    }))
}

/// Build a client from `config` sharing `store` and `navigator`.
pub fn client_for(
    config: ClientConfig,
    store: Arc<MemoryTokenStore>,
    navigator: Arc<CountingNavigator>,
) -> ApiClient {
    let store: Arc<dyn TokenStore> = store;
    let navigator: Arc<dyn LoginNavigator> = navigator;
    ApiClient::new(&config, store, navigator).expect("client")
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    backend.refresh_bodies.lock().unwrap().push(body.clone());
    tokio::time::sleep(backend.refresh_delay).await;

    if body.get("refreshToken").and_then(Value::as_str) != Some(backend.refresh_token.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid refresh token" })),
        )
            .into_response();
    }
    if !backend.refresh_status.is_success() {
        return (
            backend.refresh_status,
            Json(json!({ "message": "refresh token revoked" })),
        )
            .into_response();
    }

    let mut data = json!({ "accessToken": backend.issued_token });
    if let Some(rotated) = &backend.rotated_refresh_token {
        data["refreshToken"] = json!(rotated);
    }
    Json(json!({ "success": true, "data": data })).into_response()
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) != Some("correct-horse") {
        return Json(json!({ "success": false, "message": "Invalid credentials" })).into_response();
    }
    let email = body.get("email").cloned().unwrap_or(Value::Null);
    Json(json!({
        "success": true,
        "data": {
            "accessToken": backend.valid_token.lock().unwrap().clone(),
            "refreshToken": backend.refresh_token,
            "email": email,
            "roles": ["USER"],
        }
    }))
    .into_response()
}

async fn listing_upload(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let authorization = backend.record(&method, &uri, &headers);

    let mut fields = Vec::new();
    let mut text = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        if field.file_name().is_none() {
            if let Ok(value) = field.text().await {
                text.push((name.clone(), value));
            }
        }
        fields.push(name);
    }

    if !backend.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    backend.multipart_fields.lock().unwrap().push(fields);
    backend.multipart_text.lock().unwrap().extend(text);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "created", "data": { "_id": "new-item" } })),
    )
        .into_response()
}

async fn ask_search(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = backend.record(&method, &uri, &headers);
    if !backend.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    backend.ask_queries.lock().unwrap().push(body);
    Json(json!({
        "results": [
            { "_id": "i7", "itemName": "Road bike", "itemPrice": 45000, "score": 0.92 },
            { "_id": "i9", "itemName": "Bike rack", "score": 0.41 }
        ]
    }))
    .into_response()
}

async fn protected(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let authorization = backend.record(&method, &uri, &headers);

    match uri.path() {
        "/api/v1/item/categories" => return Json(json!(["Vehicles", "Property"])).into_response(),
        "/api/v1/truncated" => {
            let chunks = futures::stream::iter(vec![
                Ok("{\"message\":"),
                Err(std::io::Error::other("connection reset")),
            ]);
            return (StatusCode::BAD_GATEWAY, Body::from_stream(chunks)).into_response();
        }
        "/api/v1/broken" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "boom" })),
            )
                .into_response()
        }
        _ => {}
    }

    if !backend.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }

    let body = match uri.path() {
        "/api/v1/admin/users" => json!([
            { "_id": "u1", "firstname": "Nimal", "lastname": "Perera", "email": "n@x.lk", "roles": ["USER"] }
        ]),
        "/api/v1/item/all" => json!({
            "data": [{ "_id": "i1", "itemName": "Bike", "status": "APPROVED" }],
            "total": 37,
            "query": uri.query().unwrap_or_default(),
        }),
        path if path.starts_with("/api/v1/item/") && method == Method::GET => json!({
            "data": { "_id": path.trim_start_matches("/api/v1/item/"), "itemName": "Lamp" }
        }),
        _ => json!({ "success": true, "data": [] }),
    };
    Json(body).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "jwt expired" })),
    )
        .into_response()
}
