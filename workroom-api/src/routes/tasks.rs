/// Task routes
///
/// Same shape as the project routes: decode, delegate to the registry,
/// encode. The registry also owns the realtime fan-out, so these
/// handlers never talk to the hub directly.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use workroom_shared::auth::Principal;
use workroom_shared::models::task::{CreateTask, TaskPriority, TaskView, UpdateTask};

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::MessageResponse;

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Defaults to `low` when not given
    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,

    /// The project this task belongs to
    #[serde(rename = "project")]
    pub project_id: Uuid,
}

/// Task update request; omitted or blank fields keep their value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    request.validate()?;

    let task = state
        .registry
        .create_task(
            CreateTask {
                project_id: request.project_id,
                name: request.name,
                description: request.description,
                priority: request.priority,
                delivery_date: request.delivery_date,
            },
            principal.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state.registry.task_detail(id, principal.id).await?;

    Ok(Json(task))
}

/// PUT /tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state
        .registry
        .update_task(
            id,
            UpdateTask {
                name: request.name,
                description: request.description,
                priority: request.priority,
                delivery_date: request.delivery_date,
            },
            principal.id,
        )
        .await?;

    Ok(Json(task))
}

/// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.registry.delete_task(id, principal.id).await?;

    Ok(Json(MessageResponse::new("Task deleted")))
}

/// POST /tasks/status/:id
///
/// Flips completion and records the caller as the toggling user. Open
/// to collaborators as well as the creator.
pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskView>, ApiError> {
    let task = state.registry.toggle_task_status(id, principal.id).await?;

    Ok(Json(task))
}
