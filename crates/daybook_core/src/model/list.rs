//! Lists and the tasks they contain.
//!
//! # Invariants
//! - A list belongs to exactly one user; a task to exactly one list.
//! - `TaskStatus` crosses the wire and the database as the integer 0 or 1.

use super::{
    deserialize_some, require_text, EventId, ListId, TaskId, UserId, ValidationError,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Completion state of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Open => 0,
            Self::Done => 1,
        }
    }
}

impl From<TaskStatus> for i64 {
    fn from(value: TaskStatus) -> Self {
        value.as_i64()
    }
}

impl TryFrom<i64> for TaskStatus {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::Done),
            other => Err(ValidationError::InvalidTaskStatus(other)),
        }
    }
}

/// A named collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskList {
    pub id: ListId,
    pub name: String,
    pub date: NaiveDateTime,
    pub user_id: UserId,
    pub event_id: Option<EventId>,
}

/// Input for creating a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewList {
    pub name: String,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

impl NewList {
    /// Returns a copy with the name trimmed, or the validation failure.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text(&self.name, ValidationError::EmptyListName)?,
            event_id: self.event_id,
        })
    }
}

/// Partial update for a list. `event_id: Some(None)` unlinks the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub event_id: Option<Option<EventId>>,
}

impl TaskList {
    /// Checks persisted-shape invariants before a write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, ValidationError::EmptyListName).map(|_| ())
    }

    /// Applies `patch` in place after validating the changed fields.
    pub fn apply(&mut self, patch: &ListPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.name.as_deref() {
            self.name = require_text(name, ValidationError::EmptyListName)?;
        }
        if let Some(event_id) = patch.event_id {
            self.event_id = event_id;
        }
        Ok(())
    }
}

/// One actionable item inside a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    pub date: NaiveDateTime,
    pub updated: Option<NaiveDateTime>,
    pub list_id: ListId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl NewTask {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: TaskStatus::Open,
        }
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            description: require_text(&self.description, ValidationError::EmptyTaskDescription)?,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none()
    }
}

impl Task {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.description, ValidationError::EmptyTaskDescription).map(|_| ())
    }

    /// Applies `patch` in place and stamps `updated` when anything changed.
    pub fn apply(&mut self, patch: &TaskPatch, now: NaiveDateTime) -> Result<(), ValidationError> {
        if let Some(description) = patch.description.as_deref() {
            self.description = require_text(description, ValidationError::EmptyTaskDescription)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if !patch.is_empty() {
            self.updated = Some(now);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ListPatch, NewTask, TaskPatch, TaskStatus};
    use crate::model::ValidationError;

    #[test]
    fn task_status_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "1");
        let parsed: TaskStatus = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, TaskStatus::Open);
        assert!(serde_json::from_str::<TaskStatus>("2").is_err());
        assert_eq!(
            TaskStatus::try_from(7).unwrap_err(),
            ValidationError::InvalidTaskStatus(7)
        );
    }

    #[test]
    fn list_patch_distinguishes_missing_and_null_event() {
        let missing: ListPatch = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(missing.event_id, None);

        let cleared: ListPatch = serde_json::from_str(r#"{"event_id":null}"#).unwrap();
        assert_eq!(cleared.event_id, Some(None));

        let linked: ListPatch = serde_json::from_str(r#"{"event_id":4}"#).unwrap();
        assert_eq!(linked.event_id, Some(Some(4)));
    }

    #[test]
    fn new_task_defaults_to_open_and_rejects_blank_description() {
        let task: NewTask = serde_json::from_str(r#"{"description":" buy milk "}"#).unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.normalized().unwrap().description, "buy milk");
        assert_eq!(
            NewTask::new("  ").normalized().unwrap_err(),
            ValidationError::EmptyTaskDescription
        );
    }

    #[test]
    fn empty_task_patch_is_detected() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
