//! File loading and merging for aether configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{default_model, AssistantConfig, Config, LimitsConfig, SearchConfig};

/// Written to `config.toml` the first time aether runs.
const DEFAULT_CONFIG_TOML: &str = r#"model = "gpt-4o"

[provider.openai]
api_key = "{env:OPENAI_API_KEY}"

[provider.tavily]
api_key = "{env:TAVILY_API_KEY}"

[assistant]
# id = "asst_..."
# mode = "reuse"
vector_store_ids = []

[limits]
max_tool_rounds = 10
stream_timeout_secs = 120
tool_timeout_secs = 60
max_concurrent_tools = 4
"#;

impl Config {
    /// Loads the global config from `~/.config/aether/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            return toml::from_str(DEFAULT_CONFIG_TOML).context("Failed to parse default config");
        }
        Self::load_file(&path)
    }

    /// Loads `aether.toml` from the working directory or a parent, if any.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let cwd = std::env::current_dir()?;
        Self::find_project_config(&cwd)
            .map(|path| Self::load_file(&path))
            .transpose()
    }

    fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            instructions: if project.instructions != crate::constants::DEFAULT_INSTRUCTIONS {
                project.instructions
            } else {
                global.instructions
            },
            // Credentials stay global.
            provider: global.provider,
            assistant: AssistantConfig {
                id: project.assistant.id.or(global.assistant.id),
                name: project.assistant.name.or(global.assistant.name),
                mode: project.assistant.mode.or(global.assistant.mode),
                vector_store_ids: if project.assistant.vector_store_ids.is_empty() {
                    global.assistant.vector_store_ids
                } else {
                    project.assistant.vector_store_ids
                },
            },
            limits: LimitsConfig {
                max_tool_rounds: project.limits.max_tool_rounds.or(global.limits.max_tool_rounds),
                stream_timeout_secs: project
                    .limits
                    .stream_timeout_secs
                    .or(global.limits.stream_timeout_secs),
                tool_timeout_secs: project
                    .limits
                    .tool_timeout_secs
                    .or(global.limits.tool_timeout_secs),
                max_concurrent_tools: project
                    .limits
                    .max_concurrent_tools
                    .or(global.limits.max_concurrent_tools),
            },
            search: SearchConfig {
                depth: project.search.depth.or(global.search.depth),
                max_results: project.search.max_results.or(global.search.max_results),
                include_answer: project.search.include_answer.or(global.search.include_answer),
                include_raw_content: project
                    .search
                    .include_raw_content
                    .or(global.search.include_raw_content),
            },
        }
    }
}
