// Request/response pipeline applied around every dispatched call.
//
// Request steps run in order on the built `reqwest::Request` right before it
// is executed; response steps run in order on the status of whatever came
// back, before the body is read. Token injection and the 401 session reset
// are the two standard steps.

use crate::error::Result;
use crate::session::Session;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, StatusCode};
use std::sync::Arc;

pub trait RequestStep: Send + Sync {
    fn on_request(&self, request: &mut Request) -> Result<()>;
}

pub trait ResponseStep: Send + Sync {
    fn on_response(&self, status: StatusCode);
}

/// Attaches `Authorization: Bearer <token>` when the session holds a token.
pub struct BearerAuth {
    session: Arc<Session>,
}

impl BearerAuth {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl RequestStep for BearerAuth {
    fn on_request(&self, request: &mut Request) -> Result<()> {
        let Some(token) = self.session.token() else {
            request.headers_mut().remove(AUTHORIZATION);
            return Ok(());
        };
        let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}")) else {
            // Unusable token (e.g. a corrupted token file): drop it and go
            // on unauthenticated, as a 401 would.
            tracing::warn!("held token is not a valid header value; clearing it");
            self.session.clear();
            request.headers_mut().remove(AUTHORIZATION);
            return Ok(());
        };
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Drops the session when the server rejects our credentials.
pub struct ClearSessionOnUnauthorized {
    session: Arc<Session>,
}

impl ClearSessionOnUnauthorized {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl ResponseStep for ClearSessionOnUnauthorized {
    fn on_response(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("server rejected credentials; clearing session");
            self.session.clear();
        }
    }
}

/// Ordered request and response steps.
#[derive(Clone, Default)]
pub struct Pipeline {
    request_steps: Vec<Arc<dyn RequestStep>>,
    response_steps: Vec<Arc<dyn ResponseStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer token injection plus session reset on 401.
    pub fn standard(session: Arc<Session>) -> Self {
        Self::new()
            .with_request_step(BearerAuth::new(Arc::clone(&session)))
            .with_response_step(ClearSessionOnUnauthorized::new(session))
    }

    pub fn with_request_step(mut self, step: impl RequestStep + 'static) -> Self {
        self.request_steps.push(Arc::new(step));
        self
    }

    pub fn with_response_step(mut self, step: impl ResponseStep + 'static) -> Self {
        self.response_steps.push(Arc::new(step));
        self
    }

    pub fn prepare(&self, request: &mut Request) -> Result<()> {
        for step in &self.request_steps {
            step.on_request(request)?;
        }
        Ok(())
    }

    pub fn inspect(&self, status: StatusCode) {
        for step in &self.response_steps {
            step.on_response(status);
        }
    }
}
