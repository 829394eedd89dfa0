//! End-to-end command pipeline
//!
//! One call to [`CommandProcessor::process`] handles one turn: a pending
//! confirmation is resolved first, otherwise the text is parsed, validated
//! and, when accepted, executed against the task manager. Turns are handled
//! strictly one at a time per [`Session`].

use crate::backend::SchedulingBackend;
use crate::command::dialogue::{is_affirmative, ConversationContext, DialogueState};
use crate::command::executor::CommandExecutor;
use crate::command::response;
use crate::command::validator::{Validation, Validator};
use crate::core::clock::Clock;
use crate::core::config::PipelineConfig;
use crate::core::error::{Result, SchedulerError};
use crate::core::types::SessionId;
use crate::host::PresentationHost;
use crate::nlp::tokenize::contains_word;
use crate::nlp::NlpEngine;
use crate::tasks::TaskManager;
use chrono::NaiveDate;
use tracing::{debug, error, info};

/// Words that route input to the sign-in prompt
pub const AUTH_WORDS: &[&str] = &["connect", "login", "authenticate"];

/// Per-session dialogue state
#[derive(Debug, Default)]
pub struct Session {
    id: SessionId,
    context: ConversationContext,
    state: DialogueState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }
}

pub struct CommandProcessor {
    engine: NlpEngine,
    validator: Validator,
    clock: Box<dyn Clock>,
}

impl CommandProcessor {
    pub fn new(engine: NlpEngine, config: &PipelineConfig, clock: impl Clock + 'static) -> Self {
        Self {
            engine,
            validator: Validator::new(config),
            clock: Box::new(clock),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Handle one turn and return the reply; never fails
    pub fn process<B: SchedulingBackend>(
        &self,
        session: &mut Session,
        manager: &mut TaskManager<B>,
        text: &str,
    ) -> String {
        match self.respond(session, manager, text) {
            Ok(reply) => reply,
            Err(SchedulerError::NotAuthenticated) => response::NOT_AUTHENTICATED.to_string(),
            Err(e) => {
                error!(session = %session.id.0, text, error = %e, "Command processing error");
                response::APOLOGY.to_string()
            }
        }
    }

    fn respond<B: SchedulingBackend>(
        &self,
        session: &mut Session,
        manager: &mut TaskManager<B>,
        text: &str,
    ) -> Result<String> {
        if let Some(pending) = session.state.take() {
            if !is_affirmative(text) {
                info!(intent = %pending.intent, "Pending command cancelled");
                return Ok(response::CANCELLED.to_string());
            }
            debug!(text = %pending.text, "Re-running confirmed command");
            return self.run(session, manager, &pending.text, true);
        }
        self.run(session, manager, text, false)
    }

    fn run<B: SchedulingBackend>(
        &self,
        session: &mut Session,
        manager: &mut TaskManager<B>,
        text: &str,
        confirmed: bool,
    ) -> Result<String> {
        if !manager.is_authenticated() {
            return Err(SchedulerError::NotAuthenticated);
        }
        let today = self.today();
        let parsed = self.engine.parse(text, today);
        match self
            .validator
            .validate(&parsed, &session.context, today, confirmed)
        {
            Validation::Accept(command) => {
                session
                    .context
                    .record(command.intent(), Some(command.task_name()));
                Ok(CommandExecutor::execute(manager, &command).message)
            }
            Validation::Clarify { question, pending } => {
                session.state = DialogueState::AwaitingConfirmation(pending);
                Ok(question)
            }
            Validation::Reject { message } => Ok(message),
        }
    }

    /// Host-facing entry point: echo, pending yes/no, sign-in routing, auth
    /// gate, then [`process`](Self::process). The host's state bag is
    /// rewritten from the session afterwards.
    pub fn handle_input<B, H>(
        &self,
        session: &mut Session,
        manager: &mut TaskManager<B>,
        host: &mut H,
        text: &str,
    ) where
        B: SchedulingBackend,
        H: PresentationHost + ?Sized,
    {
        host.display_message(text, true);
        let lower = text.trim().to_lowercase();

        // a pending confirmation takes any input as its answer
        let reply = if session.state.is_awaiting() {
            self.process(session, manager, text)
        } else if AUTH_WORDS.iter().any(|word| contains_word(&lower, word)) {
            Self::sign_in(manager, host)
        } else if lower == "help" || (!manager.is_authenticated() && contains_word(&lower, "help"))
        {
            response::HELP_TEXT.to_string()
        } else if !manager.is_authenticated() {
            response::NOT_AUTHENTICATED.to_string()
        } else {
            self.process(session, manager, text)
        };

        host.display_message(&reply, false);
        host.state_mut()
            .sync(&session.state, manager.is_authenticated());
    }

    fn sign_in<B, H>(manager: &mut TaskManager<B>, host: &mut H) -> String
    where
        B: SchedulingBackend,
        H: PresentationHost + ?Sized,
    {
        let Some(credentials) = host.prompt_authentication() else {
            return response::AUTH_CANCELLED.to_string();
        };
        if manager.authenticate(&credentials.client_id, &credentials.client_secret) {
            response::AUTH_SUCCESS.to_string()
        } else {
            response::AUTH_FAILURE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::core::clock::FixedClock;
    use crate::core::types::TaskStatus;
    use crate::host::{Credentials, TranscriptHost};
    use crate::tasks::TaskStore;
    use std::sync::OnceLock;
    use tempfile::{tempdir, TempDir};

    fn processor() -> &'static CommandProcessor {
        static PROCESSOR: OnceLock<CommandProcessor> = OnceLock::new();
        PROCESSOR.get_or_init(|| {
            let config = PipelineConfig {
                semantic_status: false,
                ..PipelineConfig::default()
            };
            CommandProcessor::new(
                NlpEngine::with_categories([("roofing", "Roofing")], &config),
                &config,
                FixedClock(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()),
            )
        })
    }

    fn manager(backend: InMemoryBackend) -> (TempDir, TaskManager<InMemoryBackend>) {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("s.json"), dir.path().join("m.json"));
        let manager = TaskManager::open(backend, store).unwrap();
        (dir, manager)
    }

    #[test]
    fn test_status_update_turn() {
        let (_dir, mut manager) = manager(InMemoryBackend::offline());
        let mut session = Session::new();
        let reply = processor().process(
            &mut session,
            &mut manager,
            "Update the status for slab A to complete",
        );
        // local-first: cache changes although the backend has no such task
        assert_eq!(reply, response::BACKEND_FAILURE);
        assert_eq!(manager.status("Slab A"), Some(TaskStatus::Complete));
        assert_eq!(session.context().last_task(), Some("Slab A"));
    }

    #[test]
    fn test_clarify_then_cancel() {
        let (_dir, mut manager) = manager(InMemoryBackend::offline());
        let mut session = Session::new();
        let reply = processor().process(
            &mut session,
            &mut manager,
            "Update the status for stair 1000",
        );
        assert!(reply.contains("'Stair 1000'"));
        assert!(session.state().is_awaiting());
        assert_eq!(session.context().last_task(), None);

        let reply = processor().process(&mut session, &mut manager, "no");
        assert_eq!(reply, response::CANCELLED);
        assert!(!session.state().is_awaiting());
        assert!(manager.snapshot().is_empty());
    }

    #[test]
    fn test_unauthenticated_turn_is_refused() {
        let (_dir, mut manager) = manager(InMemoryBackend::new());
        let mut session = Session::new();
        let reply = processor().process(&mut session, &mut manager, "Delete railing task");
        assert_eq!(reply, response::NOT_AUTHENTICATED);
        assert!(manager.backend().calls().is_empty());
    }

    #[test]
    fn test_handle_input_gate_and_sign_in() {
        let (_dir, mut manager) = manager(InMemoryBackend::new());
        let mut session = Session::new();
        let mut host = TranscriptHost::new();

        processor().handle_input(&mut session, &mut manager, &mut host, "add roofing");
        assert_eq!(host.last_reply(), Some(response::NOT_AUTHENTICATED));
        assert_eq!(host.messages()[0], ("add roofing".to_string(), true));

        processor().handle_input(&mut session, &mut manager, &mut host, "I need help");
        assert_eq!(host.last_reply(), Some(response::HELP_TEXT));

        host.set_credentials(Credentials::new("id", "secret"));
        processor().handle_input(&mut session, &mut manager, &mut host, "connect");
        assert_eq!(host.last_reply(), Some(response::AUTH_SUCCESS));
        assert!(host.state().authenticated);

        processor().handle_input(&mut session, &mut manager, &mut host, "add roofing");
        assert_eq!(
            host.last_reply(),
            Some("Created new task 'Roofing' scheduled for October 16, 2026.")
        );
    }

    #[test]
    fn test_host_state_mirrors_pending_command() {
        let (_dir, mut manager) = manager(InMemoryBackend::offline());
        let mut session = Session::new();
        let mut host = TranscriptHost::new();

        processor().handle_input(
            &mut session,
            &mut manager,
            &mut host,
            "Update the status for stair 1000",
        );
        assert!(host.state().awaiting_confirmation);
        let pending = host.state().pending_command.as_ref().unwrap();
        assert_eq!(pending.intent, crate::core::types::Intent::UpdateStatus);
        assert_eq!(pending.entities.task_name.as_deref(), Some("Stair 1000"));

        processor().handle_input(&mut session, &mut manager, &mut host, "nope");
        assert!(!host.state().awaiting_confirmation);
        assert!(host.state().pending_command.is_none());
    }

    #[test]
    fn test_help_and_sign_in_words_answer_a_pending_question() {
        let (_dir, mut manager) = manager(InMemoryBackend::offline());
        let mut session = Session::new();
        let mut host = TranscriptHost::new();
        host.set_credentials(Credentials::new("id", "secret"));

        for reply in ["help", "connect"] {
            processor().handle_input(
                &mut session,
                &mut manager,
                &mut host,
                "Update the status for stair 1000",
            );
            assert!(session.state().is_awaiting());

            processor().handle_input(&mut session, &mut manager, &mut host, reply);
            assert_eq!(host.last_reply(), Some(response::CANCELLED), "{reply}");
            assert!(!session.state().is_awaiting());
            assert!(!host.state().awaiting_confirmation);
        }
        assert!(manager
            .backend()
            .calls()
            .iter()
            .all(|call| !matches!(call, crate::backend::BackendCall::Authenticate { .. })));
    }

    #[test]
    fn test_small_talk_without_context_asks_for_task() {
        let (_dir, mut manager) = manager(InMemoryBackend::offline());
        let mut session = Session::new();
        for text in ["thanks", "hello there", "never mind"] {
            let reply = processor().process(&mut session, &mut manager, text);
            assert_eq!(reply, response::ASK_TASK, "{text}");
            assert!(!session.state().is_awaiting());
        }
        assert!(manager.backend().calls().is_empty());
    }
}
