pub mod executor;
pub mod extract_content;
pub mod web_search;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ToolError;
use crate::search::{ExtractionService, SearchOptions, SearchService};

pub use executor::ToolExecutor;
use extract_content::ExtractContentTool;
use web_search::WebSearchTool;

/// Definition sent to the assistant service so the model knows what tools exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description for the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with already-parsed JSON input.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// Deserializes tool input into its typed form, rejecting schema mismatches.
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::ArgumentParse(e.to_string()))
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup. A later registration with
    /// the same name replaces the earlier one.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::from(tool));
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Produce definitions for the assistant service.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// How many tools are registered.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistry {
    /// Create a registry with `web_search` and `extract_content`.
    pub fn with_builtins(
        search: Arc<dyn SearchService>,
        extractor: Arc<dyn ExtractionService>,
        options: SearchOptions,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(WebSearchTool::new(search, options)));
        registry.register(Box::new(ExtractContentTool::new(extractor)));
        registry
    }
}

#[cfg(test)]
pub(crate) mod tests;
