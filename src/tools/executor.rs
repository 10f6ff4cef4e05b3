//! Safe invocation of registered tools.
//!
//! [`ToolExecutor`] turns each [`ToolCallRequest`] into exactly one
//! [`ToolCallResult`]. Malformed arguments, unknown tools, handler failures
//! and timeouts all become error payloads; nothing here aborts a turn.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::ToolRegistry;
use crate::error::ToolError;
use crate::message::{ToolCallRequest, ToolCallResult};

/// Runs tool calls against a shared [`ToolRegistry`].
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
    max_concurrency: usize,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration, max_concurrency: usize) -> Self {
        Self {
            registry,
            timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Executes one call. Always returns a result for `request.call_id`.
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolCallResult {
        debug!(tool = %request.tool_name, call_id = %request.call_id, "executing tool");
        let outcome = self
            .try_execute(request)
            .await
            .and_then(|value| serde_json::to_string(&value).map_err(ToolError::execution));

        match outcome {
            Ok(body) => ToolCallResult::json(&request.call_id, body),
            Err(err) => {
                warn!(tool = %request.tool_name, call_id = %request.call_id, error = %err, "tool call failed");
                ToolCallResult::error(&request.call_id, err.to_payload())
            }
        }
    }

    async fn try_execute(&self, request: &ToolCallRequest) -> Result<Value, ToolError> {
        let tool = self.registry.lookup(&request.tool_name)?;
        let input = parse_arguments(&request.arguments)?;
        tokio::time::timeout(self.timeout, tool.execute(input))
            .await
            .map_err(|_| ToolError::Timeout(self.timeout))?
    }

    /// Executes a whole batch concurrently, bounded by `max_concurrency`.
    ///
    /// Returns one result per request. Results arrive in completion order,
    /// so callers match them by `call_id`, not position.
    pub async fn execute_batch(&self, requests: &[ToolCallRequest]) -> Vec<ToolCallResult> {
        stream::iter(requests)
            .map(|request| self.execute(request))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await
    }
}

/// Parses the raw argument string the model produced.
///
/// An empty string is treated as an empty object.
fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::ArgumentParse(e.to_string()))
}
