use super::{require, ApiClient, ApiRequest, Payload};
use crate::error::{ApiError, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// `/auth/*`: the only group that writes the session token.
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in and keep the returned access token as the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Payload> {
        require(username, "username")?;
        if password.is_empty() {
            return Err(ApiError::validation("password must not be empty"));
        }

        let request = ApiRequest::new(Method::POST, &["auth", "login"])
            .json(&LoginRequest { username, password })?;
        let payload = self.client.send(request).await?;

        let token = payload
            .pointer("/data/tokens/access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::auth("login response carried no access token"))?;
        self.client.session().set_token(token);
        tracing::info!(%username, "logged in");
        Ok(payload)
    }

    /// Tell the server we are leaving, then drop the local session no matter
    /// how that went.
    pub async fn logout(&self) {
        let request = ApiRequest::new(Method::POST, &["auth", "logout"]);
        if let Err(err) = self.client.send(request).await {
            tracing::warn!(error = %err, "logout request failed");
        }
        self.client.session().clear();
        tracing::info!("logged out");
    }

    /// Ask the server who the current token belongs to.
    pub async fn verify(&self) -> Result<Payload> {
        if !self.client.session().has_token() {
            return Err(ApiError::auth("no session token held"));
        }
        self.client
            .send(ApiRequest::new(Method::GET, &["auth", "verify"]))
            .await
    }
}
