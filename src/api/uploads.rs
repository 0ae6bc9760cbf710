use super::{require, ApiClient, ApiRequest, Payload};
use crate::error::{ApiError, Result};
use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;

/// An image ready to be sent as the `thumbnail` multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ThumbnailFile {
    /// The MIME type is guessed from the file name's extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("thumbnail.jpg");
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub struct Uploads<'a> {
    client: &'a ApiClient,
}

impl<'a> Uploads<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Upload a thumbnail as `multipart/form-data` and return the server's
    /// description of the stored file.
    pub async fn upload_thumbnail(&self, file: ThumbnailFile) -> Result<Payload> {
        if file.bytes.is_empty() {
            return Err(ApiError::validation("thumbnail file is empty"));
        }
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|_| ApiError::validation(format!("invalid MIME type: {}", file.mime)))?;
        let form = Form::new().part("thumbnail", part);

        let request = ApiRequest::new(Method::POST, &["upload", "thumbnail"]).multipart(form);
        self.client.send(request).await
    }

    pub async fn delete_file(&self, filename: &str) -> Result<Payload> {
        require(filename, "filename")?;
        self.client
            .send(ApiRequest::new(Method::DELETE, &["uploads", filename]))
            .await
    }
}
