/// Task model and database operations
///
/// Tasks are work items that live inside exactly one project. A task has a
/// boolean completion `status`; whoever last toggled it is recorded in
/// `completed_by`, regardless of which direction the toggle went.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     priority task_priority NOT NULL DEFAULT 'low',
///     delivery_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     status BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_by UUID REFERENCES users (id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// How urgent a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// String form, matching both the JSON and Postgres encodings
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Low
    }
}

/// A task row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub delivery_date: DateTime<Utc>,

    /// `false` = pending, `true` = complete
    pub status: bool,

    /// Who last toggled the status, if anyone
    pub completed_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attribution for the last status toggle
#[derive(Debug, Clone, Serialize)]
pub struct CompletedBy {
    pub id: Uuid,
    pub name: String,
}

/// The wire shape of a task
///
/// Same fields as [`Task`], with `completed_by` resolved to the user's
/// name so clients can show who flipped the status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,

    #[serde(rename = "project")]
    pub project_id: Uuid,

    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub delivery_date: DateTime<Utc>,
    pub status: bool,
    pub completed_by: Option<CompletedBy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row backing [`TaskView`], produced by the join queries below
#[derive(Debug, sqlx::FromRow)]
struct TaskViewRow {
    id: Uuid,
    project_id: Uuid,
    name: String,
    description: String,
    priority: TaskPriority,
    delivery_date: DateTime<Utc>,
    status: bool,
    completed_by: Option<Uuid>,
    completed_by_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskViewRow> for TaskView {
    fn from(row: TaskViewRow) -> Self {
        let completed_by = match (row.completed_by, row.completed_by_name) {
            (Some(id), Some(name)) => Some(CompletedBy { id, name }),
            _ => None,
        };

        TaskView {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            priority: row.priority,
            delivery_date: row.delivery_date,
            status: row.status,
            completed_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,

    /// Defaults to now when not given
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Input for updating a task
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub delivery_date: Option<DateTime<Utc>>,
}

impl UpdateTask {
    /// Drops empty-string fields so they keep the current value
    pub fn normalized(mut self) -> Self {
        self.name = self.name.filter(|s| !s.is_empty());
        self.description = self.description.filter(|s| !s.is_empty());
        self
    }
}

impl Task {
    /// Inserts a new task
    pub async fn create(conn: impl PgExecutor<'_>, data: CreateTask) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, name, description, priority, delivery_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING id, project_id, name, description, priority, delivery_date,
                      status, completed_by, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.delivery_date)
        .fetch_one(conn)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, description, priority, delivery_date,
                   status, completed_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Finds a task and row-locks its governing project
    ///
    /// Task mutations serialize on the project row, not the task row, so
    /// that permission checks against the project and its roster hold for
    /// the duration of the write.
    pub async fn find_locking_project(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.project_id, t.name, t.description, t.priority,
                   t.delivery_date, t.status, t.completed_by, t.created_at,
                   t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1
            FOR UPDATE OF p
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Applies a partial update, returning the new row
    ///
    /// # Returns
    ///
    /// `None` if the task does not exist.
    pub async fn update(
        conn: impl PgExecutor<'_>,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.delivery_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", delivery_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, project_id, name, description, priority, \
             delivery_date, status, completed_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(delivery_date) = data.delivery_date {
            q = q.bind(delivery_date);
        }

        q.fetch_optional(conn).await
    }

    /// Flips the completion status and records who flipped it
    ///
    /// The toggling user is written to `completed_by` in both directions,
    /// so reopening a task also re-attributes it.
    ///
    /// # Returns
    ///
    /// `None` if the task does not exist.
    pub async fn toggle_status(
        conn: impl PgExecutor<'_>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = NOT status, completed_by = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, name, description, priority, delivery_date,
                      status, completed_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Deletes a task
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted.
    pub async fn delete(conn: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads a single task in wire shape
    pub async fn view_by_id(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<TaskView>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskViewRow>(
            r#"
            SELECT t.id, t.project_id, t.name, t.description, t.priority,
                   t.delivery_date, t.status, t.completed_by,
                   u.name AS completed_by_name, t.created_at, t.updated_at
            FROM tasks t
            LEFT JOIN users u ON u.id = t.completed_by
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(TaskView::from))
    }

    /// Loads every task in a project in wire shape, newest first
    pub async fn views_for_project(
        conn: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskViewRow>(
            r#"
            SELECT t.id, t.project_id, t.name, t.description, t.priority,
                   t.delivery_date, t.status, t.completed_by,
                   u.name AS completed_by_name, t.created_at, t.updated_at
            FROM tasks t
            LEFT JOIN users u ON u.id = t.completed_by
            WHERE t.project_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(TaskView::from).collect())
    }
}
