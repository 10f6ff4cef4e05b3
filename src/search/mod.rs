//! Web search and content extraction services used by the built-in tools.
//!
//! The tools only see the [`SearchService`] and [`ExtractionService`] traits;
//! [`TavilyClient`] is the production implementation of both.

mod tavily;

pub use tavily::TavilyClient;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Fixed parameters sent with every search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOptions {
    /// `"basic"` or `"advanced"`.
    pub depth: String,
    pub max_results: u32,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

/// Runs a web search and returns the service's structured results.
#[async_trait::async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Value>;
}

/// Fetches and extracts readable content from a set of URLs.
#[async_trait::async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, urls: &[String], include_images: bool) -> Result<Value>;
}
