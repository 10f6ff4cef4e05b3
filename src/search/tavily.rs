//! Tavily search and extract API client.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ExtractionService, SearchOptions, SearchService};
use crate::config::Config;

/// HTTP client for `api.tavily.com`.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    urls: &'a [String],
    include_images: bool,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(
                crate::constants::HTTP_CONNECT_TIMEOUT_SECS,
            ))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the `[provider.tavily]` config section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .resolve_api_key("tavily")
            .context("No API key found for Tavily. Set TAVILY_API_KEY or configure it in config.toml")?;
        Self::new(api_key, config.base_url("tavily"))
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(200).collect();
            anyhow::bail!("Tavily {} returned HTTP {}: {}", path, status, text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to decode Tavily {} response", path))
    }
}

#[async_trait::async_trait]
impl SearchService for TavilyClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Value> {
        debug!(query, depth = %options.depth, "tavily search");
        let body = SearchRequest {
            query,
            search_depth: &options.depth,
            max_results: options.max_results,
            include_answer: options.include_answer,
            include_raw_content: options.include_raw_content,
        };
        self.post("search", &body).await
    }
}

#[async_trait::async_trait]
impl ExtractionService for TavilyClient {
    async fn extract(&self, urls: &[String], include_images: bool) -> Result<Value> {
        debug!(count = urls.len(), "tavily extract");
        let body = ExtractRequest {
            urls,
            include_images,
        };
        self.post("extract", &body).await
    }
}
