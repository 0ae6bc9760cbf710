use super::{require, ApiClient, ApiRequest, Payload, QueryParams};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Fields sent when creating or updating an article. Unset optional fields
/// are left out of the body so updates only touch what was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub struct Articles<'a> {
    client: &'a ApiClient,
}

impl<'a> Articles<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, query: &QueryParams) -> Result<Payload> {
        let request = ApiRequest::new(Method::GET, &["articles"]).query(query.clone());
        self.client.send(request).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Payload> {
        require(id, "article id")?;
        self.client
            .send(ApiRequest::new(Method::GET, &["articles", id]))
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Payload> {
        require(slug, "article slug")?;
        self.client
            .send(ApiRequest::new(Method::GET, &["articles", "slug", slug]))
            .await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, article: &B) -> Result<Payload> {
        let request = ApiRequest::new(Method::POST, &["articles"]).json(article)?;
        self.client.send(request).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, article: &B) -> Result<Payload> {
        require(id, "article id")?;
        let request = ApiRequest::new(Method::PUT, &["articles", id]).json(article)?;
        self.client.send(request).await
    }

    pub async fn publish(&self, id: &str) -> Result<Payload> {
        require(id, "article id")?;
        self.client
            .send(ApiRequest::new(Method::POST, &["articles", id, "publish"]))
            .await
    }

    pub async fn archive(&self, id: &str) -> Result<Payload> {
        require(id, "article id")?;
        self.client
            .send(ApiRequest::new(Method::POST, &["articles", id, "archive"]))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Payload> {
        require(id, "article id")?;
        self.client
            .send(ApiRequest::new(Method::DELETE, &["articles", id]))
            .await
    }
}
