// In-process mock of the blog backend used by the integration tests.
//
// Each test spawns its own server on an ephemeral port inside its own
// `#[tokio::test]` runtime, so state never leaks between tests. Every
// request is recorded (method, path, query, Authorization, Content-Type) so
// tests can assert on what the client actually sent.
#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use blog_cli::{ApiClient, ClientConfig, MemoryTokenStore, Session};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

// The only token the mock accepts.
pub const VALID_TOKEN: &str = "T";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    uploads: Arc<Mutex<Vec<StoredUpload>>>,
    views: Arc<AtomicU64>,
    liked: Arc<AtomicBool>,
    fail_logout: Arc<AtomicBool>,
}

impl MockState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().last().cloned().expect("at least one request")
    }

    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads.lock().expect("uploads mutex poisoned").clone()
    }

    pub fn fail_logout(&self) {
        self.fail_logout.store(true, Ordering::SeqCst);
    }
}

pub struct MockServer {
    pub base_url: String,
    pub state: MockState,
}

/// Start a fresh mock backend and return its `/api` base URL.
pub async fn spawn() -> MockServer {
    let state = MockState::default();
    let app = router(state.clone());
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server failed");
    });
    MockServer {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

/// A client against `base_url` whose session is backed by `store`.
pub fn client(base_url: &str, store: Arc<MemoryTokenStore>) -> ApiClient {
    let config = ClientConfig::new(base_url).expect("config");
    let session = Arc::new(Session::load(store));
    ApiClient::new(&config, session).expect("client")
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/verify", get(verify))
        .route("/api/articles", get(list_articles).post(create_article))
        .route(
            "/api/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/api/articles/slug/{slug}", get(get_article_by_slug))
        .route("/api/articles/{id}/publish", post(publish_article))
        .route("/api/articles/{id}/archive", post(archive_article))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/analytics/articles/{id}/view", post(increment_view))
        .route("/api/analytics/articles/{id}/like", post(toggle_like))
        .route("/api/analytics/articles/{id}/status", get(like_status))
        .route("/api/analytics/dashboard", get(dashboard))
        .route("/api/analytics/articles/top", get(top_articles))
        .route("/api/upload/thumbnail", post(upload_thumbnail))
        .route("/api/uploads/{filename}", delete(delete_upload))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    state
        .requests
        .lock()
        .expect("requests mutex poisoned")
        .push(recorded);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {VALID_TOKEN}").as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Invalid or expired token" })),
    )
        .into_response()
}

fn ok(data: Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": format!("{what} not found") })),
    )
        .into_response()
}

pub fn sample_article(id: u64) -> Value {
    json!({
        "id": id,
        "title": "Hello Rust",
        "slug": "hello-rust",
        "content": "Ownership all the way down.",
        "status": "published"
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    // Accepted, but the server forgot to issue a token.
    if body["username"] == "tokenless" {
        return ok(json!({ "user": { "username": "tokenless" } }));
    }
    if body["username"] == "user" && body["password"] == "pass" {
        ok(json!({
            "user": { "username": "user" },
            "tokens": { "access_token": VALID_TOKEN, "expires_in": 3600 }
        }))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn logout(State(state): State<MockState>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    ok(json!({ "logged_out": true }))
}

async fn verify(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "user": { "username": "user" } }))
}

async fn list_articles(Query(params): Query<BTreeMap<String, String>>) -> Response {
    ok(json!({
        "articles": [sample_article(1), sample_article(2)],
        "filters": params,
    }))
}

async fn get_article(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "plain" => return (StatusCode::OK, "just text").into_response(),
        "empty" => return StatusCode::NO_CONTENT.into_response(),
        _ => {}
    }
    match id.parse::<u64>() {
        Ok(id @ 1..=2) => ok(sample_article(id)),
        _ => not_found("Article"),
    }
}

async fn get_article_by_slug(Path(slug): Path<String>) -> Response {
    if slug == "hello-rust" || slug == "hello world" {
        ok(sample_article(1))
    } else {
        not_found("Article")
    }
}

async fn create_article(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["title"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "title is required", "field": "title" })),
        )
            .into_response();
    }
    let mut article = body;
    article["id"] = json!(99);
    (StatusCode::CREATED, Json(json!({ "success": true, "data": article }))).into_response()
}

async fn update_article(headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "changes": body }))
}

async fn delete_article(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "deleted": true }))
}

async fn publish_article(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "status": "published" }))
}

async fn archive_article(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "status": "archived" }))
}

async fn list_categories(Query(params): Query<HashMap<String, String>>) -> Response {
    ok(json!({
        "categories": [{ "id": 1, "name": "Rust" }, { "id": 2, "name": "AI" }],
        "filters": params,
    }))
}

async fn get_category(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "1" => ok(json!({ "id": 1, "name": "Rust" })),
        _ => not_found("Category"),
    }
}

async fn create_category(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut category = body;
    category["id"] = json!(3);
    (StatusCode::CREATED, Json(json!({ "success": true, "data": category }))).into_response()
}

async fn update_category(headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "changes": body }))
}

async fn delete_category(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "id": id, "deleted": true }))
}

async fn increment_view(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let views = state.views.fetch_add(1, Ordering::SeqCst) + 1;
    ok(json!({ "article_id": id, "views": views }))
}

async fn toggle_like(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let liked = !state.liked.fetch_xor(true, Ordering::SeqCst);
    ok(json!({ "article_id": id, "liked": liked }))
}

async fn like_status(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    ok(json!({ "article_id": id, "liked": state.liked.load(Ordering::SeqCst) }))
}

async fn dashboard(Query(params): Query<HashMap<String, String>>) -> Response {
    ok(json!({ "range": params.get("range"), "total_views": 1234 }))
}

async fn top_articles(Query(params): Query<HashMap<String, String>>) -> Response {
    ok(json!({
        "range": params.get("range"),
        "limit": params.get("limit"),
        "articles": [sample_article(1)],
    }))
}

async fn upload_thumbnail(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut stored = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let upload = StoredUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.expect("field bytes").to_vec(),
        };
        stored.push(json!({
            "filename": upload.file_name,
            "url": format!("/uploads/{}", upload.file_name.clone().unwrap_or_default()),
            "size": upload.bytes.len(),
        }));
        state
            .uploads
            .lock()
            .expect("uploads mutex poisoned")
            .push(upload);
    }
    match stored.pop() {
        Some(file) => ok(file),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "no file" })),
        )
            .into_response(),
    }
}

async fn delete_upload(headers: HeaderMap, Path(filename): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    ok(json!({ "filename": filename, "deleted": true }))
}
