//! Task records and the descriptors used to create and modify them

use crate::errors::{Error, Result};
use crate::types::field_mask::TaskUpdate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One to-do list entry.
///
/// Timestamps that were never set are omitted when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a fresh task stamped with `now`
    pub fn new(id: impl Into<String>, summary: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            created_at: now,
            updated_at: None,
            completed_at: None,
        }
    }

    /// Apply an update descriptor; `updated_at` is refreshed only when a field
    /// was actually carried by the descriptor.
    ///
    /// Validation happens before any field is touched, so a rejected update
    /// leaves the task unchanged.
    pub fn apply(&mut self, update: &TaskUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(summary) = &update.summary {
            validate_summary(summary)?;
        }

        if let Some(summary) = &update.summary {
            self.summary.clone_from(summary);
            self.updated_at = Some(now);
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = completed_at;
            self.updated_at = Some(now);
        }
        Ok(())
    }
}

/// The data needed to create a new task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreate {
    /// A concise description of the task
    pub summary: String,
}

impl TaskCreate {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_summary(&self.summary)
    }
}

/// A sparse set of new field values; which of them take effect is decided by
/// the accompanying `FieldMask`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    pub fn completed_at(completed_at: DateTime<Utc>) -> Self {
        Self {
            completed_at: Some(completed_at),
            ..Self::default()
        }
    }
}

fn validate_summary(summary: &str) -> Result<()> {
    if summary.trim().is_empty() {
        return Err(Error::invalid_argument("task summary cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_zero_timestamps_are_omitted() {
        let task = Task::new("1", "buy milk", at(1_700_000_000));
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["summary"], "buy milk");
        assert_eq!(json["created_at"], "2023-11-14T22:13:20Z");
        assert!(json.get("updated_at").is_none());
        assert!(json.get("completed_at").is_none());
    }

    #[test]
    fn test_apply_refreshes_updated_at() {
        let mut task = Task::new("1", "buy milk", at(10));
        let update = TaskUpdate {
            summary: None,
            completed_at: Some(Some(at(20))),
        };
        task.apply(&update, at(30)).unwrap();

        assert_eq!(task.summary, "buy milk");
        assert_eq!(task.completed_at, Some(at(20)));
        assert_eq!(task.updated_at, Some(at(30)));
        assert!(task.created_at <= task.updated_at.unwrap());
    }

    #[test]
    fn test_empty_update_leaves_task_untouched() {
        let mut task = Task::new("1", "buy milk", at(10));
        let before = task.clone();
        task.apply(&TaskUpdate::default(), at(30)).unwrap();
        assert_eq!(task, before);
    }

    #[test]
    fn test_blank_summary_is_rejected_without_side_effects() {
        let mut task = Task::new("1", "buy milk", at(10));
        let update = TaskUpdate {
            summary: Some("   ".to_string()),
            completed_at: Some(Some(at(20))),
        };

        let err = task.apply(&update, at(30)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(task.completed_at, None);
        assert_eq!(task.updated_at, None);

        assert!(TaskCreate::new("").validate().is_err());
        assert!(TaskCreate::new("walk the dog").validate().is_ok());
    }
}
