//! Command handling pipeline
//!
//! ParsedCommand -> Validator -> Validation -> CommandExecutor -> reply,
//! with the dialogue state machine holding commands that need a yes/no.

pub mod dialogue;
pub mod executor;
pub mod processor;
pub mod response;
pub mod validator;

pub use dialogue::{ConversationContext, DialogueState, PendingConfirmation};
pub use executor::{CommandExecutor, ExecutionResult};
pub use processor::{CommandProcessor, Session};
pub use validator::{TaskCommand, Validation, Validator};
