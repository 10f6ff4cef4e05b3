//! Wiring shared by `ask` and `chat`: services, tools, session and interrupts.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::assistant::{AssistantDefinition, OpenAiAssistants};
use crate::config::{AssistantMode, Config};
use crate::error::TurnError;
use crate::orchestrator::RunOrchestrator;
use crate::output::Renderer;
use crate::search::TavilyClient;
use crate::session::{AssistantBinding, ConversationSession};
use crate::tools::ToolRegistry;

/// A ready-to-use orchestrator plus the session it serves.
pub struct App {
    pub orchestrator: RunOrchestrator,
    pub session: ConversationSession,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        let service = Arc::new(OpenAiAssistants::from_config(config)?);
        let tavily = Arc::new(TavilyClient::from_config(config)?);
        let registry =
            ToolRegistry::with_builtins(tavily.clone(), tavily, config.search_options());

        let binding = binding(config, &registry)?;
        let session = ConversationSession::new(binding);
        debug!(session = %session.id(), tools = registry.len(), "session ready");

        Ok(Self {
            orchestrator: RunOrchestrator::new(service, Arc::new(registry), config.turn_limits()),
            session,
        })
    }

    /// Runs one turn; Ctrl+C while it runs cancels it.
    pub async fn ask(
        &self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<String, TurnError> {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let result = self
            .orchestrator
            .run_turn(&self.session, text, renderer, &cancel)
            .await;
        watcher.abort();
        result
    }
}

/// Registry whose tools are only described, never run.
///
/// Works without a Tavily key so `tools` and `assistant create` stay usable.
pub fn descriptor_registry(config: &Config) -> Result<ToolRegistry> {
    let tavily = Arc::new(TavilyClient::new(
        config.resolve_api_key("tavily").unwrap_or_default(),
        config.base_url("tavily"),
    )?);
    Ok(ToolRegistry::with_builtins(
        tavily.clone(),
        tavily,
        config.search_options(),
    ))
}

/// Assistant definition built from config, with today's date in the instructions.
pub fn assistant_definition(config: &Config, registry: &ToolRegistry) -> AssistantDefinition {
    AssistantDefinition {
        name: config.assistant_name().to_string(),
        model: config.model.clone(),
        instructions: config.instructions_for(Local::now().date_naive()),
        tools: registry.descriptors(),
        vector_store_ids: config.assistant.vector_store_ids.clone(),
    }
}

fn binding(config: &Config, registry: &ToolRegistry) -> Result<AssistantBinding> {
    match config.assistant_mode() {
        AssistantMode::Reuse => {
            let id = config
                .assistant
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .context("assistant.mode is \"reuse\" but assistant.id is not set")?;
            Ok(AssistantBinding::Existing(id))
        }
        AssistantMode::Create => Ok(AssistantBinding::PerSession(assistant_definition(
            config, registry,
        ))),
    }
}
