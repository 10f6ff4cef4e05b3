//! Centralized constants for aether.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "aether";

/// Default model the assistant is created with.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default assistant name used when an assistant is created per session.
pub const DEFAULT_ASSISTANT_NAME: &str = "Aether Assistant";

/// Greeting shown when an interactive chat starts.
pub const GREETING: &str = "Welcome to AetherAI - how can I assist you today?";

/// Placeholder in the instructions template replaced by the current date.
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Date format substituted into the instructions template.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Default assistant instructions. `{date}` is replaced with today's date.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are a wrestling expert, specializing in youth, high school, collegiate, and Olympic wrestling, \
including folkstyle, freestyle, and Greco-Roman styles. Assist users with their wrestling-related \
inquiries using your extensive knowledge of techniques, rules, philosophies, and strategies.

IMPORTANT - THE CURRENT DATE IS {date} - YOU WILL USE THIS IN YOUR SEARCH QUERY.

# Guidelines

- Only provide information related to amateur wrestling; do not address fake wrestling.
- For current events, perform a web search including \"amateur wrestling.\"
- Use \"https://themat.com\", \"https://uww.org\" and \"https://flowrestling.com\" with the Extract Content tool to find relevant information. DO NOT USE SEARCH WEB TOOL WITH THESE
- Assume no current events knowledge without a search.

# Output Format

Provide clear and informative responses tailored to the user's specific wrestling-related query.
";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "aether.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "AETHER_LOG";

/// Tracing filter used when `AETHER_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// --- Service endpoints ---

/// Default base URL for the OpenAI API.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Beta header value required by the Assistants API.
pub const OPENAI_ASSISTANTS_BETA: &str = "assistants=v2";

/// Default base URL for the Tavily API.
pub const TAVILY_DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Connect timeout for outbound HTTP requests, in seconds.
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

// --- Turn limits ---

/// Maximum tool-resolution rounds per turn.
pub const MAX_TOOL_ROUNDS_DEFAULT: usize = 10;

/// Bound on a single stream attempt reaching a terminal event, in seconds.
pub const STREAM_TIMEOUT_SECS_DEFAULT: u64 = 120;

/// Bound on a single tool call, in seconds.
pub const TOOL_TIMEOUT_SECS_DEFAULT: u64 = 60;

/// Maximum tool calls executed concurrently within one batch.
pub const MAX_CONCURRENT_TOOLS_DEFAULT: usize = 4;

// --- Search defaults ---

/// Search depth passed to the search service.
pub const SEARCH_DEPTH_DEFAULT: &str = "advanced";

/// Maximum number of search results requested.
pub const SEARCH_MAX_RESULTS_DEFAULT: u32 = 5;

/// Whether search responses include a generated answer.
pub const SEARCH_INCLUDE_ANSWER_DEFAULT: bool = true;

/// Whether search responses include raw page content.
pub const SEARCH_INCLUDE_RAW_CONTENT_DEFAULT: bool = true;
