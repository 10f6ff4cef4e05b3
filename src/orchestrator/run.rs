use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::stream_handler::{StreamEventHandler, StreamState};
use super::TurnLimits;
use crate::assistant::AssistantService;
use crate::error::TurnError;
use crate::message::{Role, ToolCallRequest, ToolCallResult};
use crate::output::Renderer;
use crate::session::ConversationSession;
use crate::tools::{ToolExecutor, ToolRegistry};

/// Drives whole turns against an [`AssistantService`].
pub struct RunOrchestrator {
    service: Arc<dyn AssistantService>,
    executor: ToolExecutor,
    limits: TurnLimits,
}

impl RunOrchestrator {
    pub fn new(
        service: Arc<dyn AssistantService>,
        registry: Arc<ToolRegistry>,
        limits: TurnLimits,
    ) -> Self {
        let executor =
            ToolExecutor::new(registry, limits.tool_timeout, limits.max_concurrent_tools);
        Self {
            service,
            executor,
            limits,
        }
    }

    /// Runs one turn and returns the assistant's full reply.
    ///
    /// The user message enters the session history as soon as the remote
    /// thread accepts it; the reply is appended only when the run completes
    /// with non-empty text. Cancelling `cancel` drops whatever is in flight
    /// (stream, tool batch or request) and leaves the remote run behind.
    pub async fn run_turn(
        &self,
        session: &ConversationSession,
        user_text: &str,
        renderer: &mut dyn Renderer,
        cancel: &CancellationToken,
    ) -> Result<String, TurnError> {
        let _guard = session.begin_turn()?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TurnError::Cancelled),
            outcome = self.drive_turn(session, user_text, renderer) => outcome,
        };

        match &outcome {
            Ok(text) => {
                if !text.is_empty() {
                    session.append(Role::Assistant, text.as_str());
                }
                renderer.render_done();
            }
            Err(TurnError::Cancelled) => info!(session = %session.id(), "turn cancelled"),
            Err(err) if err.is_run_failure() => {
                warn!(session = %session.id(), error = %err, "run failed");
                renderer.render_error(&err.to_string());
            }
            Err(err) => {
                error!(session = %session.id(), error = %err, "turn failed");
                renderer.render_error(&err.to_string());
            }
        }
        outcome
    }

    async fn drive_turn(
        &self,
        session: &ConversationSession,
        user_text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<String, TurnError> {
        let service = self.service.as_ref();
        let thread_id = session.thread_id(service).await?;
        let assistant_id = session.assistant_id(service).await?;

        service.add_message(thread_id, Role::User, user_text).await?;
        session.append(Role::User, user_text);

        debug!(thread_id, assistant_id, "starting run");
        // Run id and outputs to resume with; `None` opens the run.
        let mut resume: Option<(String, Vec<ToolCallResult>)> = None;
        let mut reply = String::new();
        let mut rounds = 0;

        loop {
            let open = match &resume {
                None => service.stream_run(thread_id, assistant_id),
                Some((run_id, results)) => service.submit_tool_outputs(thread_id, run_id, results),
            };
            let mut handler = StreamEventHandler::new();
            handler
                .drive(open, renderer, self.limits.stream_timeout)
                .await?;
            let (text, state) = handler.into_parts();
            reply.push_str(&text);

            let (run_id, calls) = match state {
                StreamState::Completed => {
                    info!(thread_id, rounds, chars = reply.len(), "run completed");
                    return Ok(reply);
                }
                StreamState::Failed(detail) => return Err(TurnError::RunFailed(detail)),
                StreamState::AwaitingTools { run_id, calls } => (run_id, calls),
                StreamState::Streaming => {
                    return Err(TurnError::RunFailed(
                        "stream attempt ended without a terminal event".to_string(),
                    ))
                }
            };

            if rounds >= self.limits.max_tool_rounds {
                return Err(TurnError::ToolLoopExceeded(rounds));
            }
            rounds += 1;

            let results = self.run_tools(&calls, renderer).await;
            debug!(run_id = %run_id, round = rounds, results = results.len(), "submitting tool outputs");
            resume = Some((run_id, results));
        }
    }

    /// Executes one batch and reports each call's outcome to the renderer.
    async fn run_tools(
        &self,
        calls: &[ToolCallRequest],
        renderer: &mut dyn Renderer,
    ) -> Vec<ToolCallResult> {
        for call in calls {
            renderer.tool_start(call);
        }
        info!(count = calls.len(), "running tool batch");

        let results = self.executor.execute_batch(calls).await;

        for result in &results {
            if let Some(call) = calls.iter().find(|c| c.call_id == result.call_id) {
                renderer.tool_result(call, result);
            }
        }
        results
    }
}
