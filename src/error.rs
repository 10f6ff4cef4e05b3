//! Error types for a conversational turn.
//!
//! [`ToolError`] covers failures local to a single tool call. They never
//! abort a turn: the executor renders them into the tool's output so the
//! model can react. [`TurnError`] covers failures that end the turn and
//! reach the caller.

use std::time::Duration;

use thiserror::Error;

/// A failure while executing one tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model sent arguments that are not valid JSON or do not match the schema.
    #[error("Invalid arguments: {0}")]
    ArgumentParse(String),
    /// The model asked for a tool that is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// The tool handler itself failed.
    #[error("{0}")]
    Execution(String),
    /// The tool did not finish within its time bound.
    #[error("Tool timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ToolError {
    /// Wraps any handler failure, keeping the full context chain.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        Self::Execution(format!("{:#}", err))
    }

    /// Text submitted to the model in place of a tool result.
    pub fn to_payload(&self) -> String {
        format!("Error: {}", self)
    }
}

/// A failure that aborts the whole turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The remote run ended in a failed state. Carries the remote detail verbatim.
    #[error("Run failed: {0}")]
    RunFailed(String),
    /// The model kept requesting tools past the configured round cap.
    #[error("Run failed: tool loop exceeded {0} rounds")]
    ToolLoopExceeded(usize),
    /// A stream attempt produced no terminal event in time.
    #[error("Run failed: no terminal event within {}s", .0.as_secs())]
    StreamTimeout(Duration),
    /// The caller cancelled the turn.
    #[error("Turn cancelled")]
    Cancelled,
    /// Another turn is already running on this session.
    #[error("Session is busy with another turn")]
    SessionBusy,
    /// Talking to the assistant service failed.
    #[error("Assistant service error: {0:#}")]
    Service(#[from] anyhow::Error),
}

impl TurnError {
    /// Whether the remote run itself failed (as opposed to cancellation or local state).
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            Self::RunFailed(_) | Self::ToolLoopExceeded(_) | Self::StreamTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_payload_is_prefixed() {
        let err = ToolError::UnknownTool("get_weather".into());
        assert_eq!(err.to_payload(), "Error: Unknown tool: get_weather");

        let err = ToolError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_payload(), "Error: Tool timed out after 60s");
    }

    #[test]
    fn test_run_failed_keeps_detail_verbatim() {
        let err = TurnError::RunFailed("rate_limit_exceeded: slow down".into());
        assert_eq!(err.to_string(), "Run failed: rate_limit_exceeded: slow down");
        assert!(err.is_run_failure());
        assert!(TurnError::StreamTimeout(Duration::from_secs(5)).is_run_failure());
        assert!(!TurnError::Cancelled.is_run_failure());
    }

    #[test]
    fn test_service_error_includes_context_chain() {
        let inner = anyhow::anyhow!("connection reset").context("Failed to create thread");
        let err = TurnError::from(inner);
        assert_eq!(
            err.to_string(),
            "Assistant service error: Failed to create thread: connection reset"
        );
    }
}
