// Runtime configuration, read from the environment (a `.env` file is loaded
// by `main` first).

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, e.g. `http://host/api`.
    pub base_url: Url,
    /// Request timeout. `None` leaves reqwest's default in place.
    pub timeout: Option<Duration>,
    /// Where the `access_token` entry is persisted.
    pub token_path: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: None,
            token_path: default_token_path(),
        })
    }

    /// Build a config from `BLOG_API_URL`, `BLOG_API_TIMEOUT_MS` and
    /// `BLOG_TOKEN_FILE`, with defaults for whatever is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("BLOG_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let timeout = match lookup("BLOG_API_TIMEOUT_MS") {
            Some(raw) => {
                let millis: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("BLOG_API_TIMEOUT_MS is not a number: {raw}"))?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };
        let token_path = lookup("BLOG_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_path);

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            timeout,
            token_path,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid API base URL: {raw}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("API base URL cannot carry paths: {raw}");
    }
    Ok(url)
}

/// `~/.blog_cli/access_token`, or relative to the working directory when
/// there is no home directory.
pub fn default_token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(".blog_cli").join("access_token")
}
