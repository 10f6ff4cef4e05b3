use crate::message::ToolCallRequest;

/// One decoded event from a run's stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// The run is paused until results for every call are submitted.
    RequiresAction {
        run_id: String,
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The run ended unsuccessfully. `detail` is the remote message verbatim.
    Failed { detail: String },
    /// The run finished normally.
    Completed,
}

