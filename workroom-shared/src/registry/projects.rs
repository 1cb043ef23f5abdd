/// Project operations
///
/// Listing and detail are plain reads. Everything that writes, including
/// roster changes, locks the project row first so the creator check and
/// the write land on the same state.
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{ensure_creator, ensure_member, ensure_new_collaborator};
use crate::models::project::{CreateProject, Project, ProjectDetail, UpdateProject};
use crate::models::task::Task;
use crate::models::user::{User, UserProfile};

use super::{Registry, RegistryError};

impl Registry {
    /// Lists every project the caller created or collaborates on
    pub async fn list_projects(&self, principal: Uuid) -> Result<Vec<Project>, RegistryError> {
        let projects = Project::list_for_user(&self.pool, principal).await?;

        Ok(projects)
    }

    /// Creates a project owned by the caller
    ///
    /// Any authenticated user may create projects; there is no quota.
    pub async fn create_project(
        &self,
        data: CreateProject,
        principal: Uuid,
    ) -> Result<Project, RegistryError> {
        let project = Project::create(&self.pool, data, principal).await?;

        info!(
            project_id = %project.id,
            creator_id = %principal,
            "Project created"
        );

        Ok(project)
    }

    /// Loads one project with its tasks and collaborator roster
    ///
    /// Visible to the creator and to collaborators. An existing project
    /// the caller cannot see is a permission error, not a missing one.
    pub async fn project_detail(
        &self,
        id: Uuid,
        principal: Uuid,
    ) -> Result<ProjectDetail, RegistryError> {
        let project = Project::find_by_id(&self.pool, id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;

        let roster = Project::collaborator_ids(&self.pool, id).await?;
        ensure_member(&project, &roster, principal)?;

        let tasks = Task::views_for_project(&self.pool, id).await?;
        let collaborators = Project::collaborator_profiles(&self.pool, id).await?;

        Ok(ProjectDetail {
            project,
            tasks,
            collaborators,
        })
    }

    /// Updates project fields; creator only
    pub async fn update_project(
        &self,
        id: Uuid,
        data: UpdateProject,
        principal: Uuid,
    ) -> Result<Project, RegistryError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::lock_by_id(&mut *tx, id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;
        ensure_creator(&project, principal)?;

        let updated = Project::update(&mut *tx, id, data.normalized())
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;

        tx.commit().await?;

        info!(project_id = %id, "Project updated");

        Ok(updated)
    }

    /// Deletes a project and everything in it; creator only
    ///
    /// Tasks and roster entries go with the project. There is no event
    /// for this; clients discover the deletion through the REST surface.
    pub async fn delete_project(&self, id: Uuid, principal: Uuid) -> Result<(), RegistryError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::lock_by_id(&mut *tx, id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;
        ensure_creator(&project, principal)?;

        Project::delete(&mut *tx, id).await?;

        tx.commit().await?;

        info!(project_id = %id, "Project deleted");

        Ok(())
    }

    /// Looks up a user by email for the invite flow
    ///
    /// Returns only the public profile. Any authenticated user may
    /// search; the creator check happens when the invite lands.
    pub async fn find_collaborator(&self, email: &str) -> Result<UserProfile, RegistryError> {
        let user = User::find_by_email(&self.pool, email)
            .await?
            .ok_or(RegistryError::UserNotFound)?;

        Ok(UserProfile::from(user))
    }

    /// Adds a user to a project's roster by email; creator only
    ///
    /// The creator cannot add themselves, and adding someone already on
    /// the roster is refused.
    pub async fn add_collaborator(
        &self,
        project_id: Uuid,
        email: &str,
        principal: Uuid,
    ) -> Result<(), RegistryError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::lock_by_id(&mut *tx, project_id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;
        ensure_creator(&project, principal)?;

        let user = User::find_by_email(&mut *tx, email)
            .await?
            .ok_or(RegistryError::UserNotFound)?;

        let roster = Project::collaborator_ids(&mut *tx, project_id).await?;
        ensure_new_collaborator(&project, &roster, user.id)?;

        Project::add_collaborator(&mut *tx, project_id, user.id).await?;

        tx.commit().await?;

        info!(
            project_id = %project_id,
            user_id = %user.id,
            "Collaborator added"
        );

        Ok(())
    }

    /// Removes a user from a project's roster; creator only
    ///
    /// Removal is idempotent: asking to remove someone who is not on the
    /// roster succeeds without touching anything.
    pub async fn remove_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        principal: Uuid,
    ) -> Result<(), RegistryError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::lock_by_id(&mut *tx, project_id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;
        ensure_creator(&project, principal)?;

        let removed = Project::remove_collaborator(&mut *tx, project_id, user_id).await?;

        tx.commit().await?;

        info!(
            project_id = %project_id,
            user_id = %user_id,
            removed,
            "Collaborator removal processed"
        );

        Ok(())
    }
}
