//! User-facing text

use crate::command::validator::TaskCommand;
use crate::core::types::{format_display_date, Intent};

pub const BACKEND_FAILURE: &str = "There was an error processing your request. Please try again.";
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const CANCELLED: &str = "Command cancelled. How else can I help?";
pub const ASK_TASK: &str = "Could you please specify which task you're referring to?";
pub const NOT_AUTHENTICATED: &str =
    "⚠️ You need to connect to the scheduling service first. Type 'connect' to sign in.";
pub const AUTH_SUCCESS: &str = "✅ Connected to the scheduling service successfully!";
pub const AUTH_FAILURE: &str =
    "❌ Failed to connect to the scheduling service. Please check your credentials and try again.";
pub const AUTH_CANCELLED: &str = "Connection cancelled.";
pub const WELCOME: &str = "👋 Welcome! How can I help with the schedule today?";

pub const HELP_TEXT: &str = "\
Here are some things you can say:
  • Add a new task for slab A
  • Update the status for door 1000 installation to in progress
  • Update the start date for stair 1000 to March 9
  • Update the finish date for window B to next friday
  • Delete the painting task
Type 'tasks' to list cached tasks, 'connect' to sign in, 'quit' to exit.";

pub fn ask_status(task: &str) -> String {
    format!(
        "What status would you like to set for '{}'? (complete, in progress, on hold, suspended, or not started)",
        task
    )
}

pub fn ask_date(task: &str) -> String {
    format!("When would you like to schedule '{}'?", task)
}

pub fn confirm(intent: Intent, task: &str) -> String {
    format!("Did you mean to {} '{}'? (yes/no)", intent.describe(), task)
}

/// Reply for a command the backend accepted
pub fn success(command: &TaskCommand) -> String {
    match command {
        TaskCommand::Create { name, start, .. } => format!(
            "Created new task '{}' scheduled for {}.",
            name,
            format_display_date(*start)
        ),
        TaskCommand::UpdateStatus { name, status } => {
            format!("Updated the status of '{}' to {}.", name, status)
        }
        TaskCommand::UpdateDate { name, date, kind } => format!(
            "Updated the {} for '{}' to {}.",
            kind.label(),
            name,
            format_display_date(*date)
        ),
        TaskCommand::Delete { name } => format!("Deleted task '{}'.", name),
    }
}
