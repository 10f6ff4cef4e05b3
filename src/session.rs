//! Per-user conversation state.
//!
//! A [`ConversationSession`] lives as long as the user's session and is never
//! persisted. It owns the local message history, lazily obtains the remote
//! thread (and, when configured, a per-session assistant), and admits one
//! turn at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::assistant::{AssistantDefinition, AssistantService};
use crate::error::TurnError;
use crate::message::{Message, Role};

/// Which assistant the session's runs target.
#[derive(Debug, Clone)]
pub enum AssistantBinding {
    /// An assistant that already exists remotely.
    Existing(String),
    /// Created on first use and reused for the rest of the session.
    PerSession(AssistantDefinition),
}

pub struct ConversationSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    messages: Mutex<Vec<Message>>,
    thread_id: OnceCell<String>,
    assistant_id: OnceCell<String>,
    binding: AssistantBinding,
    busy: AtomicBool,
}

impl ConversationSession {
    pub fn new(binding: AssistantBinding) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Mutex::new(Vec::new()),
            thread_id: OnceCell::new(),
            assistant_id: OnceCell::new(),
            binding,
            busy: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends one entry to the history. The only way history changes.
    pub fn append(&self, role: Role, content: impl Into<String>) {
        self.lock_messages().push(Message::new(role, content));
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.lock_messages().clone()
    }

    fn lock_messages(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The remote thread id, if one has been created yet.
    pub fn current_thread_id(&self) -> Option<&str> {
        self.thread_id.get().map(String::as_str)
    }

    /// Returns the thread id, creating the thread on first call.
    pub async fn thread_id(&self, service: &dyn AssistantService) -> Result<&str> {
        self.thread_id
            .get_or_try_init(|| service.create_thread())
            .await
            .map(String::as_str)
    }

    /// Returns the assistant id runs should target, creating it on first call
    /// when the session owns its assistant.
    pub async fn assistant_id(&self, service: &dyn AssistantService) -> Result<&str> {
        match &self.binding {
            AssistantBinding::Existing(id) => Ok(id),
            AssistantBinding::PerSession(definition) => self
                .assistant_id
                .get_or_try_init(|| service.create_assistant(definition))
                .await
                .map(String::as_str),
        }
    }

    /// Marks the session busy for the lifetime of the returned guard.
    pub(crate) fn begin_turn(&self) -> Result<TurnGuard<'_>, TurnError> {
        TurnGuard::acquire(&self.busy)
    }
}

/// Clears the busy flag on drop, including when the turn future is dropped mid-flight.
pub(crate) struct TurnGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TurnGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, TurnError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(TurnError::SessionBusy);
        }
        Ok(Self { flag })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::ScriptedService;

    fn definition() -> AssistantDefinition {
        AssistantDefinition {
            name: "Aether Assistant".into(),
            model: "gpt-4o".into(),
            instructions: "Be helpful.".into(),
            tools: Vec::new(),
            vector_store_ids: Vec::new(),
        }
    }

    #[test]
    fn test_history_preserves_order() {
        let session = ConversationSession::new(AssistantBinding::Existing("asst_1".into()));
        session.append(Role::User, "Who won 74kg?");
        session.append(Role::Assistant, "Kyle Dake.");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "Who won 74kg?");
        assert_eq!(history[1].role, Role::Assistant);
        assert!(history[0].timestamp <= history[1].timestamp);
    }

    #[test]
    fn test_history_is_a_snapshot() {
        let session = ConversationSession::new(AssistantBinding::Existing("asst_1".into()));
        session.append(Role::User, "hi");
        let before = session.history();
        let again = session.history();
        assert_eq!(before, again);

        session.append(Role::Assistant, "hello");
        assert_eq!(before.len(), 1);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_thread_created_once() {
        let service = ScriptedService::new(Vec::new());
        let session = ConversationSession::new(AssistantBinding::Existing("asst_1".into()));
        assert!(session.current_thread_id().is_none());

        let first = session.thread_id(&service).await.unwrap().to_string();
        let second = session.thread_id(&service).await.unwrap().to_string();

        assert_eq!(first, second);
        assert_eq!(session.current_thread_id(), Some(first.as_str()));
        assert_eq!(service.calls_named("create_thread"), 1);
    }

    #[tokio::test]
    async fn test_existing_assistant_is_not_created() {
        let service = ScriptedService::new(Vec::new());
        let session = ConversationSession::new(AssistantBinding::Existing("asst_1".into()));
        assert_eq!(session.assistant_id(&service).await.unwrap(), "asst_1");
        assert_eq!(service.calls_named("create_assistant"), 0);
    }

    #[tokio::test]
    async fn test_per_session_assistant_created_once() {
        let service = ScriptedService::new(Vec::new());
        let session = ConversationSession::new(AssistantBinding::PerSession(definition()));

        let first = session.assistant_id(&service).await.unwrap().to_string();
        let second = session.assistant_id(&service).await.unwrap().to_string();

        assert_eq!(first, second);
        assert_eq!(service.calls_named("create_assistant"), 1);
    }

    #[test]
    fn test_second_turn_rejected_while_busy() {
        let session = ConversationSession::new(AssistantBinding::Existing("asst_1".into()));
        let guard = session.begin_turn().unwrap();
        assert!(matches!(session.begin_turn(), Err(TurnError::SessionBusy)));
        drop(guard);
        assert!(session.begin_turn().is_ok());
    }
}
