use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{parse_input, Tool};
use crate::error::ToolError;
use crate::search::{SearchOptions, SearchService};

pub struct WebSearchTool {
    search: Arc<dyn SearchService>,
    /// Fixed for every call; the model only chooses the query.
    options: SearchOptions,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchService>, options: SearchOptions) -> Self {
        Self { search, options }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WebSearchInput {
    query: String,
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web with a given query and return relevant results."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query string"
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: WebSearchInput = parse_input(input)?;
        self.search
            .search(&input.query, &self.options)
            .await
            .map_err(ToolError::execution)
    }
}
