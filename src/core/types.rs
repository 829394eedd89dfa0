//! Core type definitions used throughout the codebase

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Display format for dates shown to users and stored in the task cache
pub const DISPLAY_DATE_FORMAT: &str = "%B %d, %Y";

/// Wire format for dates sent to the scheduling backend
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Unique identifier for an interactive session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The action a command asks for.
///
/// Closed set: input that fits none of these is mapped to the closest one
/// (with low confidence) or answered with a clarification question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateTask,
    UpdateStatus,
    UpdateDate,
    DeleteTask,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::CreateTask,
        Intent::UpdateStatus,
        Intent::UpdateDate,
        Intent::DeleteTask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateTask => "create_task",
            Intent::UpdateStatus => "update_status",
            Intent::UpdateDate => "update_date",
            Intent::DeleteTask => "delete_task",
        }
    }

    /// Short verb phrase used in confirmation questions
    pub fn describe(&self) -> &'static str {
        match self {
            Intent::CreateTask => "create",
            Intent::UpdateStatus => "update the status of",
            Intent::UpdateDate => "reschedule",
            Intent::DeleteTask => "delete",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| format!("unknown intent: {}", s))
    }
}

/// Canonical task status
///
/// Serialized in the lower-case spoken form ("in progress") so persisted
/// snapshots stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "on hold")]
    OnHold,
    #[serde(rename = "suspended")]
    Suspended,
    #[serde(rename = "complete")]
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::OnHold,
        TaskStatus::Suspended,
        TaskStatus::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::InProgress => "in progress",
            TaskStatus::OnHold => "on hold",
            TaskStatus::Suspended => "suspended",
            TaskStatus::Complete => "complete",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "⏳",
            TaskStatus::InProgress => "🔄",
            TaskStatus::OnHold => "⏸️",
            TaskStatus::Suspended => "⛔",
            TaskStatus::Complete => "✅",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

/// Which end of a task's schedule a date refers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
    #[default]
    Start,
    Finish,
}

impl DateType {
    pub fn label(&self) -> &'static str {
        match self {
            DateType::Start => "start date",
            DateType::Finish => "finish date",
        }
    }
}

/// Dates extracted from a single utterance
///
/// For a single-date utterance only the field matching `date_type` is set;
/// both are set only when the command spells out a range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date_type: DateType,
}

impl DateInfo {
    /// A single date assigned to the field selected by `date_type`
    pub fn single(date: NaiveDate, date_type: DateType) -> Self {
        match date_type {
            DateType::Start => Self {
                start_date: Some(date),
                end_date: None,
                date_type,
            },
            DateType::Finish => Self {
                start_date: None,
                end_date: Some(date),
                date_type,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// The date a date-update command should apply, preferring the field
    /// named by `date_type`
    pub fn target(&self) -> Option<NaiveDate> {
        match self.date_type {
            DateType::Start => self.start_date.or(self.end_date),
            DateType::Finish => self.end_date.or(self.start_date),
        }
    }
}

/// Typed entities pulled out of a command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub task_name: Option<String>,
    pub dates: DateInfo,
    pub status: Option<TaskStatus>,
    /// Confidence in the command's interpretation (0.0 - 1.0)
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&Intent::UpdateStatus).unwrap();
        assert_eq!(json, "\"update_status\"");
        let back: Intent = serde_json::from_str("\"delete_task\"").unwrap();
        assert_eq!(back, Intent::DeleteTask);
    }

    #[test]
    fn test_intent_from_str() {
        assert_eq!("create_task".parse::<Intent>().unwrap(), Intent::CreateTask);
        assert!("query".parse::<Intent>().is_err());
    }

    #[test]
    fn test_status_serialization_uses_spoken_form() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in progress\"");
        let back: TaskStatus = serde_json::from_str("\"not started\"").unwrap();
        assert_eq!(back, TaskStatus::NotStarted);
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!("On Hold".parse::<TaskStatus>().unwrap(), TaskStatus::OnHold);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_date_info_single_finish() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let info = DateInfo::single(date, DateType::Finish);
        assert_eq!(info.end_date, Some(date));
        assert!(info.start_date.is_none());
        assert_eq!(info.target(), Some(date));
    }

    #[test]
    fn test_date_info_target_falls_back() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let info = DateInfo {
            start_date: Some(date),
            end_date: None,
            date_type: DateType::Finish,
        };
        assert_eq!(info.target(), Some(date));
        assert!(DateInfo::default().is_empty());
    }

    #[test]
    fn test_display_date_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_display_date(date), "March 09, 2026");
    }
}
