use super::{require, ApiClient, ApiRequest, Payload, QueryParams};
use crate::error::Result;
use reqwest::Method;

/// Range used when the caller does not pick one.
pub const DEFAULT_RANGE: &str = "all";
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// View counters, likes and the dashboard aggregates.
pub struct Analytics<'a> {
    client: &'a ApiClient,
}

impl<'a> Analytics<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn increment_view(&self, article_id: &str) -> Result<Payload> {
        self.article_call(Method::POST, article_id, "view").await
    }

    pub async fn toggle_like(&self, article_id: &str) -> Result<Payload> {
        self.article_call(Method::POST, article_id, "like").await
    }

    pub async fn get_like_status(&self, article_id: &str) -> Result<Payload> {
        self.article_call(Method::GET, article_id, "status").await
    }

    pub async fn get_dashboard(&self, range: Option<&str>) -> Result<Payload> {
        let query = QueryParams::new().with("range", range.unwrap_or(DEFAULT_RANGE));
        let request = ApiRequest::new(Method::GET, &["analytics", "dashboard"]).query(query);
        self.client.send(request).await
    }

    pub async fn get_top_articles(&self, limit: Option<u32>, range: Option<&str>) -> Result<Payload> {
        let query = QueryParams::new()
            .with("limit", limit.unwrap_or(DEFAULT_TOP_LIMIT))
            .with("range", range.unwrap_or(DEFAULT_RANGE));
        let request =
            ApiRequest::new(Method::GET, &["analytics", "articles", "top"]).query(query);
        self.client.send(request).await
    }

    async fn article_call(&self, method: Method, article_id: &str, action: &str) -> Result<Payload> {
        require(article_id, "article id")?;
        let request = ApiRequest::new(method, &["analytics", "articles", article_id, action]);
        self.client.send(request).await
    }
}
