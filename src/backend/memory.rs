//! In-process scheduling backend
//!
//! Keeps tasks in a map, records the most recent calls it receives and can
//! be switched into a failing mode. Backs `--offline` runs and the test suite.

use crate::backend::{BackendResponse, BackendStatus, SchedulingBackend, TaskUpdates};
use crate::core::error::{Result, SchedulerError};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Calls kept in the log; older ones are dropped first
pub const MAX_RECORDED_CALLS: usize = 256;

/// A task as the backend stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTask {
    pub task_type: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: BackendStatus,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Authenticate { client_id: String },
    Create { name: String, start: NaiveDate, end: NaiveDate },
    Update { name: String, updates: TaskUpdates },
    Delete { name: String },
}

/// How the backend answers mutating calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    #[default]
    Healthy,
    /// Reply `success: false`
    Refuse,
    /// Fail the transport
    Unreachable,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tasks: BTreeMap<String, RemoteTask>,
    calls: Vec<BackendCall>,
    authenticated: bool,
    failure: FailureMode,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out authenticated, as an offline session has nothing to log in to
    pub fn offline() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    pub fn set_failure(&mut self, failure: FailureMode) {
        self.failure = failure;
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    fn record(&mut self, call: BackendCall) {
        if self.calls.len() == MAX_RECORDED_CALLS {
            self.calls.remove(0);
        }
        self.calls.push(call);
    }

    pub fn task(&self, name: &str) -> Option<&RemoteTask> {
        self.tasks.get(name)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    fn check_failure(&self) -> Result<Option<BackendResponse>> {
        match self.failure {
            FailureMode::Healthy => Ok(None),
            FailureMode::Refuse => Ok(Some(BackendResponse::failed("Backend refused the request"))),
            FailureMode::Unreachable => Err(SchedulerError::Backend(
                "scheduling backend unreachable".into(),
            )),
        }
    }
}

impl SchedulingBackend for InMemoryBackend {
    fn authenticate(&mut self, client_id: &str, client_secret: &str) -> Result<bool> {
        self.record(BackendCall::Authenticate {
            client_id: client_id.to_string(),
        });
        if self.failure == FailureMode::Unreachable {
            return Err(SchedulerError::Backend("scheduling backend unreachable".into()));
        }
        self.authenticated =
            self.failure == FailureMode::Healthy && !client_id.is_empty() && !client_secret.is_empty();
        Ok(self.authenticated)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn create_task(
        &mut self,
        name: &str,
        task_type: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BackendResponse> {
        self.record(BackendCall::Create {
            name: name.to_string(),
            start,
            end,
        });
        if let Some(refused) = self.check_failure()? {
            return Ok(refused);
        }
        if self.tasks.contains_key(name) {
            return Ok(BackendResponse::failed(format!("Task '{}' already exists", name)));
        }
        self.tasks.insert(
            name.to_string(),
            RemoteTask {
                task_type: task_type.to_string(),
                start,
                end,
                status: BackendStatus::NotStarted,
            },
        );
        debug!(name, "In-memory backend created task");
        Ok(BackendResponse::ok())
    }

    fn update_task(&mut self, name: &str, updates: &TaskUpdates) -> Result<BackendResponse> {
        self.record(BackendCall::Update {
            name: name.to_string(),
            updates: updates.clone(),
        });
        if let Some(refused) = self.check_failure()? {
            return Ok(refused);
        }
        let Some(mut task) = self.tasks.remove(name) else {
            return Ok(BackendResponse::failed(format!("Task '{}' not found", name)));
        };
        if let Some(start) = updates.new_start {
            task.start = start;
        }
        if let Some(end) = updates.new_end {
            task.end = end;
        }
        if let Some(status) = updates.new_status {
            task.status = status;
        }
        let key = updates.new_name.clone().unwrap_or_else(|| name.to_string());
        self.tasks.insert(key, task);
        Ok(BackendResponse::ok())
    }

    fn delete_task(&mut self, name: &str) -> Result<BackendResponse> {
        self.record(BackendCall::Delete {
            name: name.to_string(),
        });
        if let Some(refused) = self.check_failure()? {
            return Ok(refused);
        }
        match self.tasks.remove(name) {
            Some(_) => Ok(BackendResponse::ok()),
            None => Ok(BackendResponse::failed(format!("Task '{}' not found", name))),
        }
    }
}
