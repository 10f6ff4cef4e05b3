//! Message types for aether's conversation history.
//!
//! Provides the [`Message`] type kept in a session's history, plus the
//! [`ToolCallRequest`] / [`ToolCallResult`] pair exchanged with the assistant
//! service while a run waits on tools.

use chrono::{DateTime, Utc};

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Unique identifier within the run (used to match results).
    pub call_id: String,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Raw JSON arguments exactly as the model produced them.
    pub arguments: String,
}

/// Outcome of one tool call, ready to be submitted back to the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub call_id: String,
    pub output: ToolOutput,
}

/// Either the tool's JSON output or a textual error payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Json(String),
    Error(String),
}

impl ToolCallResult {
    pub fn json(call_id: impl Into<String>, body: String) -> Self {
        Self {
            call_id: call_id.into(),
            output: ToolOutput::Json(body),
        }
    }

    pub fn error(call_id: impl Into<String>, payload: String) -> Self {
        Self {
            call_id: call_id.into(),
            output: ToolOutput::Error(payload),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.output, ToolOutput::Error(_))
    }

    /// The string the assistant service receives as this call's output.
    pub fn output_text(&self) -> &str {
        match &self.output {
            ToolOutput::Json(s) | ToolOutput::Error(s) => s,
        }
    }
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role name as the assistant service expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "you"),
            Role::Assistant => write!(f, "aether"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_result_payloads() {
        let ok = ToolCallResult::json("call_1", r#"{"results":[]}"#.to_string());
        assert!(!ok.is_error());
        assert_eq!(ok.output_text(), r#"{"results":[]}"#);

        let err = ToolCallResult::error("call_2", "Error: timed out".to_string());
        assert!(err.is_error());
        assert_eq!(err.output_text(), "Error: timed out");
    }

    #[test]
    fn test_message_is_timestamped_in_utc() {
        let before = Utc::now();
        let msg = Message::new(Role::User, "who won the match?");
        assert_eq!(msg.role.as_str(), "user");
        assert_eq!(msg.content, "who won the match?");
        assert!(msg.timestamp >= before && msg.timestamp <= Utc::now());
    }
}
