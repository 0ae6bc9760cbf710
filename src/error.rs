// Normalized error type returned by every API call.
//
// Callers only ever see `ApiError`: transport failures, server rejections
// and local validation all end up here with an explicit kind, the HTTP
// status when there was one, and the server's JSON error body when it sent
// one.

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Coarse classification of an `ApiError`, handy for `match`ing without
/// destructuring the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    NotFound,
    Validation,
    Transport,
    Unknown,
}

/// What we know about a failure: the status (if a response arrived), the
/// structured error body (if the server sent JSON) and a readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub status: Option<StatusCode>,
    pub body: Option<Value>,
    pub message: String,
}

impl ErrorDetail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// Build the detail for a non-success response. The message is taken from
    /// the body's `message` or `error` field, falling back to the status reason.
    fn from_response(status: StatusCode, raw: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(raw).ok();
        let message = body
            .as_ref()
            .and_then(message_from_body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        Self {
            status: Some(status),
            body,
            message,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status.as_u16()),
            None => write!(f, "{}", self.message),
        }
    }
}

// Servers in the wild use `message`, `error` or `error.message`.
fn message_from_body(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(nested) => nested
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(ErrorDetail),
    #[error("not found: {0}")]
    NotFound(ErrorDetail),
    #[error("invalid request: {0}")]
    Validation(ErrorDetail),
    #[error("transport error: {0}")]
    Transport(ErrorDetail),
    #[error("unexpected error: {0}")]
    Unknown(ErrorDetail),
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, raw: &[u8]) -> Self {
        let detail = ErrorDetail::from_response(status, raw);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(detail),
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(detail)
            }
            _ => ApiError::Unknown(detail),
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        ApiError::Transport(ErrorDetail {
            status: err.status(),
            body: None,
            message: err.to_string(),
        })
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(ErrorDetail::message(message))
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::Auth(ErrorDetail::message(message))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Auth(_) => ErrorKind::Auth,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn detail(&self) -> &ErrorDetail {
        match self {
            ApiError::Auth(detail)
            | ApiError::NotFound(detail)
            | ApiError::Validation(detail)
            | ApiError::Transport(detail)
            | ApiError::Unknown(detail) => detail,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.detail().status
    }

    /// The server's structured error body, when it sent one.
    pub fn body(&self) -> Option<&Value> {
        self.detail().body.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.detail().message
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
