//! Field-mask driven partial updates.
//!
//! A `FieldMask` names the task fields a request is allowed to change. The
//! update engine combines it with a sparse `TaskPatch` into a `TaskUpdate` in
//! which only masked fields carry a value, whatever else the patch contains.

use crate::types::task::TaskPatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Task fields that may be named in a field mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskField {
    Summary,
    CompletedAt,
}

impl TaskField {
    pub const ALL: [TaskField; 2] = [TaskField::Summary, TaskField::CompletedAt];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskField::Summary => "summary",
            TaskField::CompletedAt => "completed_at",
        }
    }

    /// Look up a field by its wire name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "summary" => Some(TaskField::Summary),
            "completed_at" => Some(TaskField::CompletedAt),
            _ => None,
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order-irrelevant set of task fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FieldMask(BTreeSet<TaskField>);

impl FieldMask {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mask covering every updatable field
    pub fn all() -> Self {
        TaskField::ALL.into_iter().collect()
    }

    /// Build a mask from wire names, silently skipping unrecognized ones
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| TaskField::from_name(name.as_ref()))
            .collect()
    }

    pub fn contains(&self, field: TaskField) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TaskField> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TaskField> for FieldMask {
    fn from_iter<T: IntoIterator<Item = TaskField>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<String>> for FieldMask {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<FieldMask> for Vec<String> {
    fn from(mask: FieldMask) -> Self {
        mask.iter().map(|f| f.as_str().to_string()).collect()
    }
}

/// A precise update: `None` means "leave the field alone".
///
/// `completed_at` is doubly optional because clearing the completion
/// (`Some(None)`) is a legitimate update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub summary: Option<String>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

/// Translate a sparse patch plus a field mask into an update descriptor.
///
/// A masked `summary` only takes effect when the patch carries one. A masked
/// `completed_at` always does: an absent value clears the completion.
pub fn build_update(raw: &TaskPatch, fields: &FieldMask) -> TaskUpdate {
    TaskUpdate {
        summary: if fields.contains(TaskField::Summary) {
            raw.summary.clone()
        } else {
            None
        },
        completed_at: if fields.contains(TaskField::CompletedAt) {
            Some(raw.completed_at)
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_patch() -> TaskPatch {
        TaskPatch {
            summary: Some("X".to_string()),
            completed_at: Some(Utc.timestamp_opt(1_000, 0).unwrap()),
        }
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let mask = FieldMask::from_names(["summary", "deleted_at", "id", ""]);
        assert!(mask.contains(TaskField::Summary));
        assert!(!mask.contains(TaskField::CompletedAt));
        assert_eq!(mask.iter().count(), 1);
    }

    #[test]
    fn test_summary_mask_ignores_completed_at() {
        let update = build_update(&full_patch(), &FieldMask::from_names(["summary"]));
        assert_eq!(update.summary.as_deref(), Some("X"));
        assert_eq!(update.completed_at, None);
    }

    #[test]
    fn test_completed_at_mask_ignores_summary() {
        let update = build_update(&full_patch(), &FieldMask::from_names(["completed_at"]));
        assert_eq!(update.summary, None);
        assert_eq!(update.completed_at, Some(full_patch().completed_at));
    }

    #[test]
    fn test_masked_absent_completion_clears() {
        let update = build_update(&TaskPatch::default(), &FieldMask::all());
        assert_eq!(update.summary, None);
        assert_eq!(update.completed_at, Some(None));
    }

    #[test]
    fn test_empty_mask_yields_empty_update() {
        let update = build_update(&full_patch(), &FieldMask::empty());
        assert_eq!(update, TaskUpdate::default());
    }

    #[test]
    fn test_mask_serializes_as_name_list() {
        let mask: FieldMask =
            serde_json::from_str(r#"["completed_at","bogus","summary"]"#).unwrap();
        assert_eq!(mask, FieldMask::all());
        assert_eq!(
            serde_json::to_string(&mask).unwrap(),
            r#"["summary","completed_at"]"#
        );
    }
}
