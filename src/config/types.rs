//! Struct definitions and serde defaults for aether configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for aether, deserialized from `config.toml`.
///
/// Fields use serde defaults so aether can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model the assistant is created with (e.g. `"gpt-4o"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Assistant instructions. `{date}` is replaced with today's date.
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Per-service credentials and endpoints.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Which assistant runs are streamed against.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Bounds on a single turn.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Fixed parameters of the `web_search` tool.
    #[serde(default)]
    pub search: SearchConfig,
}

pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

fn default_instructions() -> String {
    crate::constants::DEFAULT_INSTRUCTIONS.to_string()
}

/// Service-specific configuration map.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// OpenAI Assistants API.
    pub openai: Option<ProviderEntry>,
    /// Tavily search and extraction API.
    pub tavily: Option<ProviderEntry>,
}

/// Connection details for a single remote service.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL (useful for proxies).
    pub base_url: Option<String>,
}

/// How the assistant identity is obtained for a session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    /// Create a fresh assistant for each session.
    Create,
    /// Stream runs against an existing assistant (`assistant.id`).
    Reuse,
}

/// Assistant identity and the resources attached when one is created.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AssistantConfig {
    /// Existing assistant ID, required for `mode = "reuse"`.
    pub id: Option<String>,
    /// Display name for created assistants.
    pub name: Option<String>,
    /// Lifecycle policy. Defaults to `reuse` when `id` is set, else `create`.
    pub mode: Option<AssistantMode>,
    /// Vector stores made available to the file_search tool.
    #[serde(default)]
    pub vector_store_ids: Vec<String>,
}

/// Bounds on a single conversational turn.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Tool-resolution rounds allowed before the turn is aborted.
    pub max_tool_rounds: Option<usize>,
    /// Seconds a stream attempt may take to reach a terminal event.
    pub stream_timeout_secs: Option<u64>,
    /// Seconds a single tool call may take.
    pub tool_timeout_secs: Option<u64>,
    /// Tool calls executed at once within a batch.
    pub max_concurrent_tools: Option<usize>,
}

/// Parameters sent with every web search.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    pub depth: Option<String>,
    pub max_results: Option<u32>,
    pub include_answer: Option<bool>,
    pub include_raw_content: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            instructions: default_instructions(),
            provider: ProviderConfig::default(),
            assistant: AssistantConfig::default(),
            limits: LimitsConfig::default(),
            search: SearchConfig::default(),
        }
    }
}
