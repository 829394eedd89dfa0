//! Command execution - applies validated commands to the task manager

use crate::backend::SchedulingBackend;
use crate::command::response;
use crate::command::validator::TaskCommand;
use crate::tasks::TaskManager;

/// Runs accepted commands against task state
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn execute<B: SchedulingBackend>(
        manager: &mut TaskManager<B>,
        command: &TaskCommand,
    ) -> ExecutionResult {
        let success = match command {
            TaskCommand::Create { name, start, end } => manager.create(name, *start, *end),
            TaskCommand::UpdateStatus { name, status } => manager.update_status(name, *status),
            TaskCommand::UpdateDate { name, date, kind } => {
                manager.update_date(name, *date, *kind)
            }
            TaskCommand::Delete { name } => manager.delete(name),
        };

        let message = if success {
            response::success(command)
        } else {
            response::BACKEND_FAILURE.to_string()
        };
        ExecutionResult { success, message }
    }
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
}
