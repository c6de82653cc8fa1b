//! REST handlers for the task collection

use super::error::ApiError;
use super::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use todo_daemon_core::{FieldMask, ResultExt, Task, TaskCreate, TaskField, TaskPatch};

/// `PATCH` body; only the keys present are changed
#[derive(Debug, Default, Deserialize)]
pub struct PatchTaskBody {
    #[serde(default)]
    pub summary: Option<String>,
    // Outer `Some` means the key was present, `Some(None)` clears
    #[serde(default, deserialize_with = "present")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl PatchTaskBody {
    /// Split the body into a patch and the mask implied by its keys
    pub fn into_patch(self) -> (TaskPatch, FieldMask) {
        let mut fields = Vec::new();
        if self.summary.is_some() {
            fields.push(TaskField::Summary);
        }
        if self.completed_at.is_some() {
            fields.push(TaskField::CompletedAt);
        }

        let patch = TaskPatch {
            summary: self.summary,
            completed_at: self.completed_at.flatten(),
        };
        (patch, fields.into_iter().collect())
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    tracing::debug!("HTTP list tasks");
    Json(state.tasks.list().await)
}

pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(create) = payload?;
    tracing::debug!("HTTP create task");

    let task = state
        .tasks
        .create(create)
        .await
        .context("cannot create task")?;
    tracing::info!(id = %task.id, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PatchTaskBody>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(body) = payload?;
    let (patch, fields) = body.into_patch();
    tracing::debug!(id = %id, fields = ?fields, "HTTP update task");

    let task = state
        .tasks
        .update(&id, &patch, &fields)
        .await
        .with_context(|| format!("cannot update task '{id}'"))?;
    tracing::info!(id = %task.id, "updated task");
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!(id = %id, "HTTP delete task");
    state
        .tasks
        .delete(&id)
        .await
        .with_context(|| format!("cannot delete task '{id}'"))?;
    tracing::info!(id = %id, "deleted task");
    Ok(StatusCode::NO_CONTENT)
}
