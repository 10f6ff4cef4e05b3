//! The hosted assistant service: threads, runs, and their event streams.
//!
//! [`AssistantService`] is the seam the orchestrator talks through;
//! [`OpenAiAssistants`] implements it against the Assistants v2 HTTP API.

mod event;
mod openai;
pub mod sse;

pub use event::RunEvent;
pub use openai::OpenAiAssistants;

use std::pin::Pin;

use anyhow::Result;
use futures::Stream;

use crate::message::{Role, ToolCallResult};
use crate::tools::ToolDescriptor;

/// Events of one stream attempt, in arrival order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RunEvent>> + Send>>;

/// Everything needed to create an assistant on the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantDefinition {
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub tools: Vec<ToolDescriptor>,
    /// Vector stores attached to the built-in `file_search` tool.
    pub vector_store_ids: Vec<String>,
}

#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    /// Creates an assistant and returns its id.
    async fn create_assistant(&self, definition: &AssistantDefinition) -> Result<String>;

    /// Creates an empty thread and returns its id.
    async fn create_thread(&self) -> Result<String>;

    async fn add_message(&self, thread_id: &str, role: Role, text: &str) -> Result<()>;

    /// Starts a run on `thread_id` and streams its events.
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<EventStream>;

    /// Submits the complete result set for a paused run and streams the resumed run.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        results: &[ToolCallResult],
    ) -> Result<EventStream>;
}
