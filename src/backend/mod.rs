//! Remote scheduling backend
//!
//! The [`SchedulingBackend`] trait is the only thing the task manager knows
//! about the remote side. [`HttpBackend`] talks to the timeliner service;
//! [`InMemoryBackend`] keeps tasks in process for offline use and tests.

pub mod client;
pub mod memory;

pub use client::HttpBackend;
pub use memory::{BackendCall, FailureMode, InMemoryBackend};

use crate::core::error::Result;
use crate::core::types::TaskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task type sent with every create request
pub const TASK_TYPE: &str = "Construct";

/// Status vocabulary of the scheduling backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendStatus {
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "Suspended")]
    Suspended,
}

impl BackendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendStatus::Completed => "Completed",
            BackendStatus::InProgress => "In Progress",
            BackendStatus::OnHold => "On Hold",
            BackendStatus::NotStarted => "Not Started",
            BackendStatus::Suspended => "Suspended",
        }
    }
}

impl From<TaskStatus> for BackendStatus {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Complete => BackendStatus::Completed,
            TaskStatus::InProgress => BackendStatus::InProgress,
            TaskStatus::OnHold => BackendStatus::OnHold,
            TaskStatus::NotStarted => BackendStatus::NotStarted,
            TaskStatus::Suspended => BackendStatus::Suspended,
        }
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update of a remote task; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdates {
    pub new_name: Option<String>,
    pub new_start: Option<NaiveDate>,
    pub new_end: Option<NaiveDate>,
    pub new_status: Option<BackendStatus>,
}

impl TaskUpdates {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            new_status: Some(status.into()),
            ..Self::default()
        }
    }

    pub fn start(date: NaiveDate) -> Self {
        Self {
            new_start: Some(date),
            ..Self::default()
        }
    }

    pub fn end(date: NaiveDate) -> Self {
        Self {
            new_end: Some(date),
            ..Self::default()
        }
    }
}

/// Outcome reported by the backend for one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Blocking interface to the remote schedule
///
/// `Err` means the call could not be made (transport, decoding); a call
/// the service refused comes back as `Ok` with `success == false`.
pub trait SchedulingBackend {
    fn authenticate(&mut self, client_id: &str, client_secret: &str) -> Result<bool>;

    fn is_authenticated(&self) -> bool;

    fn create_task(
        &mut self,
        name: &str,
        task_type: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BackendResponse>;

    fn update_task(&mut self, name: &str, updates: &TaskUpdates) -> Result<BackendResponse>;

    fn delete_task(&mut self, name: &str) -> Result<BackendResponse>;
}

impl<B: SchedulingBackend + ?Sized> SchedulingBackend for Box<B> {
    fn authenticate(&mut self, client_id: &str, client_secret: &str) -> Result<bool> {
        (**self).authenticate(client_id, client_secret)
    }

    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn create_task(
        &mut self,
        name: &str,
        task_type: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BackendResponse> {
        (**self).create_task(name, task_type, start, end)
    }

    fn update_task(&mut self, name: &str, updates: &TaskUpdates) -> Result<BackendResponse> {
        (**self).update_task(name, updates)
    }

    fn delete_task(&mut self, name: &str) -> Result<BackendResponse> {
        (**self).delete_task(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_is_total() {
        let mapped: Vec<BackendStatus> =
            TaskStatus::ALL.into_iter().map(BackendStatus::from).collect();
        assert_eq!(
            mapped,
            vec![
                BackendStatus::NotStarted,
                BackendStatus::InProgress,
                BackendStatus::OnHold,
                BackendStatus::Suspended,
                BackendStatus::Completed,
            ]
        );
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&BackendStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_response_error_is_optional() {
        let response: BackendResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(response, BackendResponse::ok());
        let response: BackendResponse =
            serde_json::from_str(r#"{"success": false, "error": "Task not found"}"#).unwrap();
        assert_eq!(response, BackendResponse::failed("Task not found"));
    }

    #[test]
    fn test_task_updates_constructors() {
        let updates = TaskUpdates::status(TaskStatus::Complete);
        assert_eq!(updates.new_status, Some(BackendStatus::Completed));
        assert!(updates.new_start.is_none() && updates.new_end.is_none());
    }
}
