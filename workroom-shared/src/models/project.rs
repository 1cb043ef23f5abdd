/// Project model and database operations
///
/// A project is the unit of collaboration and the authorization boundary
/// for everything inside it. The user who creates a project is its creator
/// and keeps full control; other users can be invited onto the roster and
/// gain a restricted view-and-toggle role.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     client VARCHAR(255) NOT NULL,
///     delivery_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     creator_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_collaborators (
///     project_id UUID NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use workroom_shared::models::project::{CreateProject, Project};
/// use uuid::Uuid;
///
/// # async fn example(pool: &sqlx::PgPool, creator: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(
///     pool,
///     CreateProject {
///         name: "Website relaunch".to_string(),
///         description: "New marketing site".to_string(),
///         client: "ACME".to_string(),
///         delivery_date: None,
///     },
///     creator,
/// )
/// .await?;
///
/// let mine = Project::list_for_user(pool, creator).await?;
/// assert!(mine.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::task::TaskView;
use crate::models::user::UserProfile;

/// A project row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Client the work is for
    pub client: String,

    /// Agreed delivery date
    pub delivery_date: DateTime<Utc>,

    /// User who created the project and holds full control
    #[serde(rename = "creator")]
    pub creator_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last modified
    pub updated_at: DateTime<Utc>,
}

/// A project together with its tasks and collaborator roster
///
/// This is the shape returned when a member opens a single project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,

    /// Tasks in the project, newest first
    pub tasks: Vec<TaskView>,

    /// Invited collaborators, in invitation order
    pub collaborators: Vec<UserProfile>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub client: String,

    /// Defaults to now when not given
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Input for updating a project
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
}

impl UpdateProject {
    /// Drops empty-string fields so they keep the current value
    ///
    /// Clients send the whole edit form, including fields the user left
    /// blank; a blank field means "no change", not "clear it".
    pub fn normalized(mut self) -> Self {
        self.name = self.name.filter(|s| !s.is_empty());
        self.description = self.description.filter(|s| !s.is_empty());
        self.client = self.client.filter(|s| !s.is_empty());
        self
    }
}

impl Project {
    /// Creates a project owned by `creator_id`
    pub async fn create(
        pool: &PgPool,
        data: CreateProject,
        creator_id: Uuid,
    ) -> Result<Project, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, client, delivery_date, creator_id)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING id, name, description, client, delivery_date, creator_id,
                      created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.client)
        .bind(data.delivery_date)
        .bind(creator_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, client, delivery_date, creator_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Finds a project by ID and row-locks it for the current transaction
    ///
    /// Mutations lock the governing project row first so permission checks
    /// and the write they guard see a single consistent state.
    pub async fn lock_by_id(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, client, delivery_date, creator_id,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Lists every project the user can see, newest first
    ///
    /// Covers both projects the user created and projects they were
    /// invited to as a collaborator.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, client, delivery_date, creator_id,
                   created_at, updated_at
            FROM projects
            WHERE creator_id = $1
               OR EXISTS (
                      SELECT 1
                      FROM project_collaborators pc
                      WHERE pc.project_id = projects.id
                        AND pc.user_id = $1
                  )
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update, returning the new row
    ///
    /// Only fields present in `data` are written.
    ///
    /// # Returns
    ///
    /// `None` if the project does not exist.
    pub async fn update(
        conn: impl PgExecutor<'_>,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.client.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client = ${}", bind_count));
        }
        if data.delivery_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", delivery_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, client, delivery_date, \
             creator_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(client) = data.client {
            q = q.bind(client);
        }
        if let Some(delivery_date) = data.delivery_date {
            q = q.bind(delivery_date);
        }

        q.fetch_optional(conn).await
    }

    /// Deletes a project; tasks and roster entries go with it
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted.
    pub async fn delete(conn: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the IDs of everyone on the collaborator roster
    pub async fn collaborator_ids(
        conn: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM project_collaborators
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_all(conn)
        .await
    }

    /// Returns collaborator profiles in invitation order
    pub async fn collaborator_profiles(
        conn: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.name, u.email
            FROM project_collaborators pc
            JOIN users u ON u.id = pc.user_id
            WHERE pc.project_id = $1
            ORDER BY pc.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(conn)
        .await
    }

    /// Adds a user to the collaborator roster
    pub async fn add_collaborator(
        conn: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_collaborators (project_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Removes a user from the collaborator roster
    ///
    /// # Returns
    ///
    /// `true` if the user was on the roster. Removing someone who was
    /// never a collaborator is not an error.
    pub async fn remove_collaborator(
        conn: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM project_collaborators
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
