/// Task operations
///
/// Task mutations lock the task's governing project, not the task row,
/// because the things being checked (who created the project, who is on
/// the roster) live on the project side. After commit, each mutation
/// hands the task's wire shape to the realtime hub.
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{ensure_creator, ensure_member};
use crate::models::project::Project;
use crate::models::task::{CreateTask, Task, TaskView, UpdateTask};
use crate::realtime::RoomEvent;

use super::{Registry, RegistryError};

impl Registry {
    /// Creates a task in a project; creator only
    pub async fn create_task(
        &self,
        data: CreateTask,
        principal: Uuid,
    ) -> Result<TaskView, RegistryError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::lock_by_id(&mut *tx, data.project_id)
            .await?
            .ok_or(RegistryError::ProjectNotFound)?;
        ensure_creator(&project, principal)?;

        let task = Task::create(&mut *tx, data).await?;
        let view = Task::view_by_id(&mut *tx, task.id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        tx.commit().await?;

        info!(task_id = %view.id, project_id = %project.id, "Task created");
        self.publish(RoomEvent::TaskAdded { task: view.clone() }).await;

        Ok(view)
    }

    /// Loads one task; creator only
    ///
    /// Collaborators see tasks through the project detail, not through
    /// direct task reads.
    pub async fn task_detail(&self, id: Uuid, principal: Uuid) -> Result<TaskView, RegistryError> {
        let view = Task::view_by_id(&self.pool, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let project = Project::find_by_id(&self.pool, view.project_id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;
        ensure_creator(&project, principal)?;

        Ok(view)
    }

    /// Updates task fields; creator only
    pub async fn update_task(
        &self,
        id: Uuid,
        data: UpdateTask,
        principal: Uuid,
    ) -> Result<TaskView, RegistryError> {
        let mut tx = self.pool.begin().await?;

        let task = Task::find_locking_project(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let project = Project::find_by_id(&mut *tx, task.project_id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;
        ensure_creator(&project, principal)?;

        Task::update(&mut *tx, id, data.normalized())
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let view = Task::view_by_id(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        tx.commit().await?;

        info!(task_id = %id, project_id = %project.id, "Task updated");
        self.publish(RoomEvent::TaskEdited { task: view.clone() }).await;

        Ok(view)
    }

    /// Deletes a task; creator only
    pub async fn delete_task(&self, id: Uuid, principal: Uuid) -> Result<(), RegistryError> {
        let mut tx = self.pool.begin().await?;

        let task = Task::find_locking_project(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let project = Project::find_by_id(&mut *tx, task.project_id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;
        ensure_creator(&project, principal)?;

        // Capture the wire shape first; the event carries the task that
        // no longer exists once the delete commits.
        let view = Task::view_by_id(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        Task::delete(&mut *tx, id).await?;

        tx.commit().await?;

        info!(task_id = %id, project_id = %project.id, "Task deleted");
        self.publish(RoomEvent::TaskDeleted { task: view }).await;

        Ok(())
    }

    /// Flips a task's completion status; creator or collaborator
    ///
    /// Whoever toggles is recorded as the completing user in both
    /// directions, so reopening a task also re-attributes it.
    pub async fn toggle_task_status(
        &self,
        id: Uuid,
        principal: Uuid,
    ) -> Result<TaskView, RegistryError> {
        let mut tx = self.pool.begin().await?;

        let task = Task::find_locking_project(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let project = Project::find_by_id(&mut *tx, task.project_id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let roster = Project::collaborator_ids(&mut *tx, project.id).await?;
        ensure_member(&project, &roster, principal)?;

        Task::toggle_status(&mut *tx, id, principal)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        let view = Task::view_by_id(&mut *tx, id)
            .await?
            .ok_or(RegistryError::TaskNotFound)?;

        tx.commit().await?;

        info!(
            task_id = %id,
            project_id = %project.id,
            status = view.status,
            "Task status toggled"
        );
        self.publish(RoomEvent::TaskStatusChanged { task: view.clone() })
            .await;

        Ok(view)
    }

    /// Hands an event to the realtime hub after a successful commit
    ///
    /// Delivery is best effort; an empty room is normal and never an
    /// error.
    async fn publish(&self, event: RoomEvent) {
        let name = event.name();
        let delivered = self.rooms.emit(event).await;

        debug!(event = name, sessions = delivered, "Realtime event published");
    }
}
