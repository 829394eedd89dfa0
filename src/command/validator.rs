//! Confidence and completeness gating
//!
//! Turns a [`ParsedCommand`] into exactly one of three outcomes: an
//! executable [`TaskCommand`], a question that parks the command until the
//! user answers, or a plain rejection.

use crate::command::dialogue::{ConversationContext, PendingConfirmation};
use crate::command::response;
use crate::core::config::PipelineConfig;
use crate::core::types::{DateType, Intent, TaskStatus};
use crate::nlp::ParsedCommand;
use chrono::{Days, NaiveDate};
use tracing::debug;

/// A fully specified action for the task manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Create {
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    UpdateStatus {
        name: String,
        status: TaskStatus,
    },
    UpdateDate {
        name: String,
        date: NaiveDate,
        kind: DateType,
    },
    Delete {
        name: String,
    },
}

impl TaskCommand {
    pub fn intent(&self) -> Intent {
        match self {
            TaskCommand::Create { .. } => Intent::CreateTask,
            TaskCommand::UpdateStatus { .. } => Intent::UpdateStatus,
            TaskCommand::UpdateDate { .. } => Intent::UpdateDate,
            TaskCommand::Delete { .. } => Intent::DeleteTask,
        }
    }

    pub fn task_name(&self) -> &str {
        match self {
            TaskCommand::Create { name, .. }
            | TaskCommand::UpdateStatus { name, .. }
            | TaskCommand::UpdateDate { name, .. }
            | TaskCommand::Delete { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accept(TaskCommand),
    /// Ask `question` and hold `pending` until the reply
    Clarify {
        question: String,
        pending: PendingConfirmation,
    },
    Reject {
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct Validator {
    confidence_threshold: f32,
    default_duration_days: u64,
}

impl Validator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            default_duration_days: config.default_duration_days.max(0) as u64,
        }
    }

    /// `confirmed` skips the confidence gate for a command the user already
    /// said yes to; required fields are checked either way
    pub fn validate(
        &self,
        parsed: &ParsedCommand,
        context: &ConversationContext,
        today: NaiveDate,
        confirmed: bool,
    ) -> Validation {
        let entities = &parsed.entities;
        let Some(name) = entities
            .task_name
            .clone()
            .or_else(|| context.last_task().map(str::to_string))
        else {
            debug!(intent = %parsed.intent, "No task name and no previous task");
            return Validation::Reject {
                message: response::ASK_TASK.to_string(),
            };
        };

        let clarify = |question: String| Validation::Clarify {
            question,
            pending: PendingConfirmation {
                text: parsed.text.clone(),
                intent: parsed.intent,
                entities: entities.clone(),
            },
        };

        let command = match parsed.intent {
            Intent::CreateTask => {
                let start = entities.dates.start_date.unwrap_or(today);
                let end = entities.dates.end_date.unwrap_or_else(|| {
                    start
                        .checked_add_days(Days::new(self.default_duration_days))
                        .unwrap_or(start)
                });
                TaskCommand::Create { name, start, end }
            }
            Intent::UpdateStatus => match entities.status {
                Some(status) => TaskCommand::UpdateStatus { name, status },
                None => return clarify(response::ask_status(&name)),
            },
            Intent::UpdateDate => match entities.dates.target() {
                Some(date) => TaskCommand::UpdateDate {
                    name,
                    date,
                    kind: entities.dates.date_type,
                },
                None => return clarify(response::ask_date(&name)),
            },
            Intent::DeleteTask => TaskCommand::Delete { name },
        };

        if !confirmed && parsed.confidence() < self.confidence_threshold {
            debug!(
                intent = %parsed.intent,
                confidence = parsed.confidence(),
                "Below confidence threshold, asking for confirmation"
            );
            return clarify(response::confirm(parsed.intent, command.task_name()));
        }
        Validation::Accept(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DateInfo, ExtractedEntities};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn parsed(intent: Intent, task: Option<&str>, confidence: f32) -> ParsedCommand {
        ParsedCommand {
            text: "some command".into(),
            intent,
            entities: ExtractedEntities {
                task_name: task.map(str::to_string),
                confidence,
                ..ExtractedEntities::default()
            },
        }
    }

    fn validator() -> Validator {
        Validator::new(&PipelineConfig::default())
    }

    #[test]
    fn test_create_defaults_dates() {
        let outcome = validator().validate(
            &parsed(Intent::CreateTask, Some("Roofing"), 1.0),
            &ConversationContext::new(),
            today(),
            false,
        );
        assert_eq!(
            outcome,
            Validation::Accept(TaskCommand::Create {
                name: "Roofing".into(),
                start: today(),
                end: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
            })
        );
    }

    #[test]
    fn test_missing_status_asks() {
        let outcome = validator().validate(
            &parsed(Intent::UpdateStatus, Some("Stair 1000"), 1.0),
            &ConversationContext::new(),
            today(),
            false,
        );
        match outcome {
            Validation::Clarify { question, pending } => {
                assert!(question.contains("'Stair 1000'"));
                assert_eq!(pending.intent, Intent::UpdateStatus);
                assert_eq!(pending.text, "some command");
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_date_asks_even_when_confirmed() {
        let outcome = validator().validate(
            &parsed(Intent::UpdateDate, Some("Window B"), 1.0),
            &ConversationContext::new(),
            today(),
            true,
        );
        assert!(matches!(
            outcome,
            Validation::Clarify { ref question, .. } if question == "When would you like to schedule 'Window B'?"
        ));
    }

    #[test]
    fn test_finish_date_command() {
        let mut command = parsed(Intent::UpdateDate, Some("Door 1000 Installation"), 1.0);
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        command.entities.dates = DateInfo::single(date, DateType::Finish);
        let outcome = validator().validate(&command, &ConversationContext::new(), today(), false);
        assert_eq!(
            outcome,
            Validation::Accept(TaskCommand::UpdateDate {
                name: "Door 1000 Installation".into(),
                date,
                kind: DateType::Finish,
            })
        );
    }

    #[test]
    fn test_no_task_anywhere_is_rejected() {
        let outcome = validator().validate(
            &parsed(Intent::DeleteTask, None, 0.3),
            &ConversationContext::new(),
            today(),
            false,
        );
        assert_eq!(
            outcome,
            Validation::Reject {
                message: response::ASK_TASK.into()
            }
        );
    }

    #[test]
    fn test_last_task_fills_in() {
        let mut context = ConversationContext::new();
        context.record(Intent::CreateTask, Some("Slab A"));
        let outcome = validator().validate(
            &parsed(Intent::DeleteTask, None, 1.0),
            &context,
            today(),
            false,
        );
        assert_eq!(
            outcome,
            Validation::Accept(TaskCommand::Delete {
                name: "Slab A".into()
            })
        );
    }

    #[test]
    fn test_low_confidence_asks_then_accepts_when_confirmed() {
        let command = parsed(Intent::DeleteTask, Some("Painting"), 0.4);
        let context = ConversationContext::new();
        match validator().validate(&command, &context, today(), false) {
            Validation::Clarify { question, .. } => {
                assert_eq!(question, "Did you mean to delete 'Painting'? (yes/no)")
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
        assert!(matches!(
            validator().validate(&command, &context, today(), true),
            Validation::Accept(TaskCommand::Delete { .. })
        ));
    }
}
