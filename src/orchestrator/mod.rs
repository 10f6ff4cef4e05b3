//! The streaming tool-call loop for one conversational turn.
//!
//! [`RunOrchestrator::run_turn`] sends the user's message, streams the run,
//! executes any tool batches the model asks for, submits their results and
//! resumes streaming until the run completes or fails.

mod run;
mod stream_handler;

pub use run::RunOrchestrator;

use std::time::Duration;

use crate::constants::{
    MAX_CONCURRENT_TOOLS_DEFAULT, MAX_TOOL_ROUNDS_DEFAULT, STREAM_TIMEOUT_SECS_DEFAULT,
    TOOL_TIMEOUT_SECS_DEFAULT,
};

/// Bounds applied to every turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnLimits {
    /// Tool batches allowed per turn before giving up.
    pub max_tool_rounds: usize,
    /// Deadline for one stream attempt to reach a terminal event.
    pub stream_timeout: Duration,
    /// Deadline for a single tool call.
    pub tool_timeout: Duration,
    pub max_concurrent_tools: usize,
}

impl Default for TurnLimits {
    fn default() -> Self {
        Self {
            max_tool_rounds: MAX_TOOL_ROUNDS_DEFAULT,
            stream_timeout: Duration::from_secs(STREAM_TIMEOUT_SECS_DEFAULT),
            tool_timeout: Duration::from_secs(TOOL_TIMEOUT_SECS_DEFAULT),
            max_concurrent_tools: MAX_CONCURRENT_TOOLS_DEFAULT,
        }
    }
}
