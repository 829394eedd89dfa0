//! Presentation host interface
//!
//! A host shows messages and keeps a small state bag it renders from. The
//! bag mirrors the session's dialogue state after every turn; the session
//! stays authoritative.

pub mod console;

pub use console::ConsoleHost;

use crate::command::dialogue::{DialogueState, PendingConfirmation};
use crate::core::types::{ExtractedEntities, Intent};
use serde::{Deserialize, Serialize};

/// The held command as the host sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCommand {
    pub intent: Intent,
    pub entities: ExtractedEntities,
}

impl From<&PendingConfirmation> for PendingCommand {
    fn from(pending: &PendingConfirmation) -> Self {
        Self {
            intent: pending.intent,
            entities: pending.entities.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostState {
    pub awaiting_confirmation: bool,
    pub pending_command: Option<PendingCommand>,
    pub authenticated: bool,
}

impl HostState {
    pub fn sync(&mut self, dialogue: &DialogueState, authenticated: bool) {
        self.awaiting_confirmation = dialogue.is_awaiting();
        self.pending_command = dialogue.pending().map(PendingCommand::from);
        self.authenticated = authenticated;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

pub trait PresentationHost {
    fn display_message(&mut self, text: &str, is_user: bool);

    fn state(&self) -> &HostState;

    fn state_mut(&mut self) -> &mut HostState;

    /// Ask the user to sign in; `None` when they decline
    fn prompt_authentication(&mut self) -> Option<Credentials> {
        None
    }
}

/// Host that keeps every message in memory
#[derive(Debug, Default)]
pub struct TranscriptHost {
    messages: Vec<(String, bool)>,
    state: HostState,
    credentials: Option<Credentials>,
}

impl TranscriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials handed out on the next sign-in prompt
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    pub fn messages(&self) -> &[(String, bool)] {
        &self.messages
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|(_, is_user)| !is_user)
            .map(|(text, _)| text.as_str())
    }
}

impl PresentationHost for TranscriptHost {
    fn display_message(&mut self, text: &str, is_user: bool) {
        self.messages.push((text.to_string(), is_user));
    }

    fn state(&self) -> &HostState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HostState {
        &mut self.state
    }

    fn prompt_authentication(&mut self) -> Option<Credentials> {
        self.credentials.take()
    }
}
