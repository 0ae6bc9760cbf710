use super::{require, ApiClient, ApiRequest, Payload, QueryParams};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct Categories<'a> {
    client: &'a ApiClient,
}

impl<'a> Categories<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, query: &QueryParams) -> Result<Payload> {
        let request = ApiRequest::new(Method::GET, &["categories"]).query(query.clone());
        self.client.send(request).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Payload> {
        require(id, "category id")?;
        self.client
            .send(ApiRequest::new(Method::GET, &["categories", id]))
            .await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, category: &B) -> Result<Payload> {
        let request = ApiRequest::new(Method::POST, &["categories"]).json(category)?;
        self.client.send(request).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, category: &B) -> Result<Payload> {
        require(id, "category id")?;
        let request = ApiRequest::new(Method::PUT, &["categories", id]).json(category)?;
        self.client.send(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<Payload> {
        require(id, "category id")?;
        self.client
            .send(ApiRequest::new(Method::DELETE, &["categories", id]))
            .await
    }
}
