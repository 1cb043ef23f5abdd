/// Project routes
///
/// Thin handlers over the registry: decode the request, hand it to the
/// registry with the caller's identity, encode the result. Permission
/// decisions live in the registry, not here.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use workroom_shared::auth::Principal;
use workroom_shared::models::project::{CreateProject, Project, ProjectDetail, UpdateProject};
use workroom_shared::models::user::UserProfile;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::MessageResponse;

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, max = 255, message = "Client is required"))]
    pub client: String,

    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Project update request; omitted or blank fields keep their value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Collaborator search request
#[derive(Debug, Deserialize, Validate)]
pub struct FindCollaboratorRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Collaborator invite request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCollaboratorRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Collaborator removal request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCollaboratorRequest {
    pub user_id: Uuid,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.registry.list_projects(principal.id).await?;

    Ok(Json(projects))
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    request.validate()?;

    let project = state
        .registry
        .create_project(
            CreateProject {
                name: request.name,
                description: request.description,
                client: request.client,
                delivery_date: request.delivery_date,
            },
            principal.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let detail = state.registry.project_detail(id, principal.id).await?;

    Ok(Json(detail))
}

/// PUT /projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .registry
        .update_project(
            id,
            UpdateProject {
                name: request.name,
                description: request.description,
                client: request.client,
                delivery_date: request.delivery_date,
            },
            principal.id,
        )
        .await?;

    Ok(Json(project))
}

/// DELETE /projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.registry.delete_project(id, principal.id).await?;

    Ok(Json(MessageResponse::new("Project deleted")))
}

/// POST /projects/collaborators
///
/// Looks up a user by email so the client can show who it is about to
/// invite. Does not change anything.
pub async fn find_collaborator(
    State(state): State<AppState>,
    Json(request): Json<FindCollaboratorRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    let profile = state.registry.find_collaborator(&request.email).await?;

    Ok(Json(profile))
}

/// POST /projects/collaborators/:id
pub async fn add_collaborator(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCollaboratorRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    state
        .registry
        .add_collaborator(id, &request.email, principal.id)
        .await?;

    Ok(Json(MessageResponse::new("Collaborator added")))
}

/// POST /projects/eliminate-collaborator/:id
pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(request): Json<RemoveCollaboratorRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .registry
        .remove_collaborator(id, request.user_id, principal.id)
        .await?;

    Ok(Json(MessageResponse::new("Collaborator removed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_camel_case() {
        let request: CreateProjectRequest = serde_json::from_str(
            r#"{
                "name": "Website relaunch",
                "description": "New marketing site",
                "client": "ACME",
                "deliveryDate": "2026-09-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(request.name, "Website relaunch");
        assert!(request.delivery_date.is_some());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_delivery_date_is_optional() {
        let request: CreateProjectRequest = serde_json::from_str(
            r#"{"name": "P", "description": "D", "client": "C"}"#,
        )
        .unwrap();

        assert!(request.delivery_date.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_blank_fields() {
        let request: CreateProjectRequest = serde_json::from_str(
            r#"{"name": "", "description": "D", "client": "C"}"#,
        )
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_remove_request_uses_user_id_key() {
        let id = Uuid::new_v4();
        let request: RemoveCollaboratorRequest =
            serde_json::from_str(&format!(r#"{{"userId": "{id}"}}"#)).unwrap();

        assert_eq!(request.user_id, id);
    }
}
