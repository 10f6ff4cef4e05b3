use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::assistant::{EventStream, RunEvent};
use crate::error::TurnError;
use crate::message::ToolCallRequest;
use crate::output::Renderer;

/// Where one stream attempt stands.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamState {
    Streaming,
    AwaitingTools {
        run_id: String,
        calls: Vec<ToolCallRequest>,
    },
    Failed(String),
    Completed,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamState::Streaming)
    }
}

/// Consumes the events of a single stream attempt.
///
/// Text fragments are kept in arrival order and forwarded to the renderer as
/// they come in. The first fragment also fires `activity_started`.
pub struct StreamEventHandler {
    state: StreamState,
    fragments: Vec<String>,
}

impl Default for StreamEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamEventHandler {
    pub fn new() -> Self {
        Self {
            state: StreamState::Streaming,
            fragments: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// All text of this attempt, in order.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    pub fn into_parts(self) -> (String, StreamState) {
        (self.fragments.concat(), self.state)
    }

    /// Applies one event. Events arriving after a terminal state are dropped.
    pub fn apply(&mut self, event: RunEvent, renderer: &mut dyn Renderer) {
        if self.state.is_terminal() {
            warn!(?event, "event after terminal state ignored");
            return;
        }

        self.state = match event {
            RunEvent::TextDelta(text) => {
                if self.fragments.is_empty() {
                    renderer.activity_started();
                }
                renderer.render_token(&text);
                self.fragments.push(text);
                StreamState::Streaming
            }
            RunEvent::RequiresAction { run_id, tool_calls } => {
                debug!(run_id = %run_id, calls = tool_calls.len(), "run requires tools");
                StreamState::AwaitingTools {
                    run_id,
                    calls: tool_calls,
                }
            }
            RunEvent::Failed { detail } => StreamState::Failed(detail),
            RunEvent::Completed => StreamState::Completed,
        };
    }

    /// Opens a stream attempt with `open` and feeds its events into the
    /// handler until a terminal state is reached.
    ///
    /// Opening and consuming share one deadline: fails with `StreamTimeout` if
    /// both together take longer than `timeout`, and with `RunFailed` if the
    /// stream ends first.
    pub async fn drive<F>(
        &mut self,
        open: F,
        renderer: &mut dyn Renderer,
        timeout: Duration,
    ) -> Result<(), TurnError>
    where
        F: Future<Output = anyhow::Result<EventStream>>,
    {
        let consume = async {
            let mut events = open.await?;
            while let Some(event) = events.next().await {
                self.apply(event?, renderer);
                if self.is_terminal() {
                    return Ok(());
                }
            }
            Err(TurnError::RunFailed(
                "event stream ended before the run finished".to_string(),
            ))
        };

        tokio::time::timeout(timeout, consume)
            .await
            .map_err(|_| TurnError::StreamTimeout(timeout))?
    }
}
