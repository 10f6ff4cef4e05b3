use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{parse_input, Tool};
use crate::error::ToolError;
use crate::search::ExtractionService;

pub struct ExtractContentTool {
    extractor: Arc<dyn ExtractionService>,
}

impl ExtractContentTool {
    pub fn new(extractor: Arc<dyn ExtractionService>) -> Self {
        Self { extractor }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractContentInput {
    urls: Vec<String>,
}

#[async_trait::async_trait]
impl Tool for ExtractContentTool {
    fn name(&self) -> &str {
        "extract_content"
    }

    fn description(&self) -> &str {
        "Extract content from specific URLs."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["urls"],
            "properties": {
                "urls": {
                    "type": "array",
                    "description": "List of URLs to extract content from",
                    "items": {
                        "type": "string",
                        "description": "A URL to extract content from"
                    }
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let input: ExtractContentInput = parse_input(input)?;
        if input.urls.is_empty() {
            return Err(ToolError::ArgumentParse("urls must not be empty".into()));
        }
        self.extractor
            .extract(&input.urls, false)
            .await
            .map_err(ToolError::execution)
    }
}
