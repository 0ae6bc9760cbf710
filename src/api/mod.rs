// API client module: an async HTTP client for the blog backend.
//
// `ApiClient` owns the reqwest client, the base URL, the shared `Session`
// and the middleware `Pipeline`. Resource groups (`auth()`, `articles()`,
// ...) borrow the client and turn each operation into exactly one
// `ApiRequest`, which `send` dispatches through the pipeline.

mod analytics;
mod articles;
mod auth;
mod categories;
mod uploads;

pub use analytics::{Analytics, DEFAULT_RANGE, DEFAULT_TOP_LIMIT};
pub use articles::{ArticleDraft, Articles};
pub use auth::Auth;
pub use categories::{Categories, CategoryDraft};
pub use uploads::{ThumbnailFile, Uploads};

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorDetail, Result};
use crate::middleware::Pipeline;
use crate::session::Session;
use anyhow::Context;
use reqwest::multipart::Form;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whatever JSON the server answered with, untouched.
pub type Payload = Value;

/// The business data inside the server's `{ "data": ... }` envelope, or the
/// payload itself when there is no envelope.
pub fn envelope_data(payload: &Payload) -> &Value {
    payload.get("data").unwrap_or(payload)
}

/// Filter parameters passed through as the query string. Keys are kept
/// sorted so identical filters always produce identical URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

pub(crate) enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// One call's worth of method, path, query and body.
pub(crate) struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: QueryParams,
    body: RequestBody,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: QueryParams::default(),
            body: RequestBody::Empty,
        }
    }

    pub(crate) fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::validation(format!("request body is not serializable: {err}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub(crate) fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// Reject blank identifiers before they turn into a malformed path.
pub(crate) fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
    pipeline: Pipeline,
}

impl ApiClient {
    /// Build a client with the standard pipeline (bearer token injection and
    /// session reset on 401).
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            pipeline: Pipeline::standard(Arc::clone(&session)),
            session,
        })
    }

    /// Replace the middleware pipeline.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn articles(&self) -> Articles<'_> {
        Articles::new(self)
    }

    pub fn categories(&self) -> Categories<'_> {
        Categories::new(self)
    }

    pub fn analytics(&self) -> Analytics<'_> {
        Analytics::new(self)
    }

    pub fn uploads(&self) -> Uploads<'_> {
        Uploads::new(self)
    }

    fn endpoint(&self, segments: &[String]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::validation("API base URL cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Dispatch one request through the pipeline and normalize the outcome.
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<Payload> {
        let url = self.endpoint(&request.segments)?;
        let mut builder = self.http.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let mut http_request = builder.build().map_err(ApiError::transport)?;
        self.pipeline.prepare(&mut http_request)?;

        let method = http_request.method().clone();
        let path = http_request.url().path().to_string();
        tracing::debug!(%method, %path, "sending request");

        let response = self.http.execute(http_request).await.map_err(|err| {
            tracing::warn!(%method, %path, error = %err, "request did not complete");
            ApiError::transport(err)
        })?;
        let status = response.status();
        self.pipeline.inspect(status);

        let raw = response.bytes().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            let err = ApiError::from_response(status, &raw);
            tracing::debug!(%method, %path, status = status.as_u16(), error = %err, "request failed");
            return Err(err);
        }
        tracing::debug!(%method, %path, status = status.as_u16(), "request succeeded");

        if raw.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&raw).map_err(|err| {
            ApiError::Unknown(ErrorDetail {
                status: Some(status),
                body: None,
                message: format!("response body is not JSON: {err}"),
            })
        })
    }
}
