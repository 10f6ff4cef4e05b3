//! Environment variable substitution, API key resolution, and effective settings.

use std::time::Duration;

use chrono::NaiveDate;

use super::types::{AssistantMode, Config, ProviderEntry};

use crate::constants::{
    DATE_FORMAT, DATE_PLACEHOLDER, DEFAULT_ASSISTANT_NAME, MAX_CONCURRENT_TOOLS_DEFAULT,
    MAX_TOOL_ROUNDS_DEFAULT, OPENAI_DEFAULT_BASE_URL, SEARCH_DEPTH_DEFAULT,
    SEARCH_INCLUDE_ANSWER_DEFAULT, SEARCH_INCLUDE_RAW_CONTENT_DEFAULT, SEARCH_MAX_RESULTS_DEFAULT,
    STREAM_TIMEOUT_SECS_DEFAULT, TAVILY_DEFAULT_BASE_URL, TOOL_TIMEOUT_SECS_DEFAULT,
};
use crate::orchestrator::TurnLimits;
use crate::search::SearchOptions;

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        if let Some(ref mut id) = self.assistant.id {
            *id = Self::resolve_str(id);
        }
        for store in &mut self.assistant.vector_store_ids {
            *store = Self::resolve_str(store);
        }
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.tavily);
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    ///
    /// Substituted values are inserted literally; they are not scanned again.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        let mut from = 0;
        while let Some(offset) = result[from..].find("{env:") {
            let start = from + offset;
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let value = std::env::var(&result[start + 5..start + end]).unwrap_or_default();
            result.replace_range(start..start + end + 1, &value);
            from = start + value.len();
        }
        result
    }

    /// Resolve API key for a service: env var first, then config value.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.to_uppercase());
        if let Ok(val) = std::env::var(&env_key) {
            if !val.is_empty() {
                return Some(val);
            }
        }

        self.provider_entry(provider)
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// Base URL for a service, falling back to its public endpoint.
    pub fn base_url(&self, provider: &str) -> String {
        let default = match provider {
            "tavily" => TAVILY_DEFAULT_BASE_URL,
            _ => OPENAI_DEFAULT_BASE_URL,
        };
        self.provider_entry(provider)
            .and_then(|e| e.base_url.clone())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn provider_entry(&self, provider: &str) -> Option<&ProviderEntry> {
        match provider {
            "openai" => self.provider.openai.as_ref(),
            "tavily" => self.provider.tavily.as_ref(),
            _ => None,
        }
    }

    /// Effective assistant lifecycle policy.
    pub fn assistant_mode(&self) -> AssistantMode {
        self.assistant.mode.unwrap_or(if self.assistant.id.is_some() {
            AssistantMode::Reuse
        } else {
            AssistantMode::Create
        })
    }

    /// Display name for assistants created by aether.
    pub fn assistant_name(&self) -> &str {
        self.assistant
            .name
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_NAME)
    }

    /// Instructions with the `{date}` placeholder filled in.
    pub fn instructions_for(&self, date: NaiveDate) -> String {
        self.instructions
            .replace(DATE_PLACEHOLDER, &date.format(DATE_FORMAT).to_string())
    }

    /// Bounds applied to every turn.
    pub fn turn_limits(&self) -> TurnLimits {
        let limits = &self.limits;
        TurnLimits {
            max_tool_rounds: limits.max_tool_rounds.unwrap_or(MAX_TOOL_ROUNDS_DEFAULT),
            stream_timeout: Duration::from_secs(
                limits.stream_timeout_secs.unwrap_or(STREAM_TIMEOUT_SECS_DEFAULT),
            ),
            tool_timeout: Duration::from_secs(
                limits.tool_timeout_secs.unwrap_or(TOOL_TIMEOUT_SECS_DEFAULT),
            ),
            max_concurrent_tools: limits
                .max_concurrent_tools
                .unwrap_or(MAX_CONCURRENT_TOOLS_DEFAULT)
                .max(1),
        }
    }

    /// Parameters for the `web_search` tool.
    pub fn search_options(&self) -> SearchOptions {
        let search = &self.search;
        SearchOptions {
            depth: search
                .depth
                .clone()
                .unwrap_or_else(|| SEARCH_DEPTH_DEFAULT.to_string()),
            max_results: search.max_results.unwrap_or(SEARCH_MAX_RESULTS_DEFAULT),
            include_answer: search.include_answer.unwrap_or(SEARCH_INCLUDE_ANSWER_DEFAULT),
            include_raw_content: search
                .include_raw_content
                .unwrap_or(SEARCH_INCLUDE_RAW_CONTENT_DEFAULT),
        }
    }
}
