//! Conversation context and the confirmation state machine

use crate::core::types::{ExtractedEntities, Intent};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MAX_RECENT_TASKS: usize = 5;

/// Replies that confirm a pending command (substring match)
pub const AFFIRMATIVE_WORDS: &[&str] = &["yes", "yeah", "correct", "right", "sure", "ok"];

pub fn is_affirmative(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    AFFIRMATIVE_WORDS.iter().any(|word| lower.contains(word))
}

/// What the session remembers between commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    last_task: Option<String>,
    last_intent: Option<Intent>,
    /// Most recent first, no duplicates
    recent_tasks: VecDeque<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_task(&self) -> Option<&str> {
        self.last_task.as_deref()
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.last_intent
    }

    pub fn recent_tasks(&self) -> impl Iterator<Item = &str> {
        self.recent_tasks.iter().map(String::as_str)
    }

    /// Remember an accepted command
    pub fn record(&mut self, intent: Intent, task: Option<&str>) {
        self.last_intent = Some(intent);
        let Some(task) = task else {
            return;
        };
        self.last_task = Some(task.to_string());
        if let Some(pos) = self.recent_tasks.iter().position(|t| t == task) {
            self.recent_tasks.remove(pos);
        }
        self.recent_tasks.push_front(task.to_string());
        self.recent_tasks.truncate(MAX_RECENT_TASKS);
    }
}

/// A command held back until the user answers yes or no
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// Original command text, re-run on confirmation
    pub text: String,
    pub intent: Intent,
    pub entities: ExtractedEntities,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingConfirmation),
}

impl DialogueState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, DialogueState::AwaitingConfirmation(_))
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        match self {
            DialogueState::Idle => None,
            DialogueState::AwaitingConfirmation(pending) => Some(pending),
        }
    }

    /// Return to `Idle`, handing back whatever was pending
    pub fn take(&mut self) -> Option<PendingConfirmation> {
        match std::mem::take(self) {
            DialogueState::Idle => None,
            DialogueState::AwaitingConfirmation(pending) => Some(pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_replies() {
        for reply in ["yes", "Yeah!", "that's correct", "Sure thing", "OK"] {
            assert!(is_affirmative(reply), "{reply}");
        }
        for reply in ["no", "nope", "cancel", "mark it complete"] {
            assert!(!is_affirmative(reply), "{reply}");
        }
    }

    #[test]
    fn test_record_moves_task_to_front() {
        let mut context = ConversationContext::new();
        context.record(Intent::CreateTask, Some("Slab A"));
        context.record(Intent::UpdateStatus, Some("Window B"));
        context.record(Intent::UpdateDate, Some("Slab A"));

        assert_eq!(context.last_task(), Some("Slab A"));
        assert_eq!(context.last_intent(), Some(Intent::UpdateDate));
        assert_eq!(
            context.recent_tasks().collect::<Vec<_>>(),
            vec!["Slab A", "Window B"]
        );
    }

    #[test]
    fn test_recent_tasks_bounded() {
        let mut context = ConversationContext::new();
        for n in 0..8 {
            context.record(Intent::CreateTask, Some(&format!("Stair {n}")));
        }
        assert_eq!(context.recent_tasks().count(), MAX_RECENT_TASKS);
        assert_eq!(context.recent_tasks().next(), Some("Stair 7"));
        assert_eq!(context.recent_tasks().last(), Some("Stair 3"));
    }

    #[test]
    fn test_record_without_task_keeps_last_task() {
        let mut context = ConversationContext::new();
        context.record(Intent::CreateTask, Some("Painting"));
        context.record(Intent::DeleteTask, None);
        assert_eq!(context.last_task(), Some("Painting"));
        assert_eq!(context.last_intent(), Some(Intent::DeleteTask));
    }

    #[test]
    fn test_take_resets_state() {
        let mut state = DialogueState::AwaitingConfirmation(PendingConfirmation {
            text: "Update the status for stair 1000".into(),
            intent: Intent::UpdateStatus,
            entities: ExtractedEntities::default(),
        });
        assert!(state.is_awaiting());
        let pending = state.take().unwrap();
        assert_eq!(pending.intent, Intent::UpdateStatus);
        assert_eq!(state, DialogueState::Idle);
        assert!(state.take().is_none());
    }
}
