/// Common test utilities for integration tests
///
/// Provides a [`TestContext`] that connects to the test database, runs
/// migrations, creates a confirmed user with a session token, and builds
/// the full router with a no-op mailer. Every context tags its rows with
/// a unique run ID so parallel tests never see each other's data and
/// cleanup is a single cascading delete.
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use workroom_api::app::{build_router, AppState};
use workroom_api::config::Config;
use workroom_api::mail::NoopMailer;
use workroom_shared::auth::jwt;
use workroom_shared::auth::password::hash_password;
use workroom_shared::auth::tokens::generate_account_token;
use workroom_shared::models::project::{CreateProject, Project};
use workroom_shared::models::task::{CreateTask, Task, TaskPriority};
use workroom_shared::models::user::{CreateUser, User};
use workroom_shared::realtime::RoomHub;

/// Password used for every user a test creates directly
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    /// The hub behind the app, for asserting on realtime fan-out
    pub rooms: Arc<RoomHub>,
    /// Unique tag for this context's rows
    pub run_id: Uuid,
    /// A confirmed user ready to make authenticated calls
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path is relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let run_id = Uuid::new_v4();

        let state = AppState::new(db.clone(), Arc::new(NoopMailer), config.clone());
        let rooms = state.rooms.clone();
        let app = build_router(state);

        let mut ctx = TestContext {
            db,
            app,
            config,
            rooms,
            run_id,
            user: placeholder_user(),
            jwt_token: String::new(),
        };

        let (user, jwt_token) = ctx.create_user("owner").await?;
        ctx.user = user;
        ctx.jwt_token = jwt_token;

        Ok(ctx)
    }

    /// An email address tagged with this context's run ID
    pub fn email_for(&self, name: &str) -> String {
        format!("{}-{}@example.com", name.to_lowercase(), self.run_id)
    }

    /// Creates a confirmed user and a session token for them
    pub async fn create_user(&self, name: &str) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                name: name.to_string(),
                email: self.email_for(name),
                password_hash: hash_password(TEST_PASSWORD)?,
                token: generate_account_token(),
            },
        )
        .await?;

        User::confirm(&self.db, user.id).await?;

        let token = jwt::create_token(user.id, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Authorization header for the context's default user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Authorization header for any session token
    pub fn auth_header_for(token: &str) -> String {
        format!("Bearer {token}")
    }

    /// Deletes every user this context created, cascading to their
    /// projects, tasks, and roster rows
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE email LIKE $1")
            .bind(format!("%-{}@example.com", self.run_id))
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Creates a project owned by `creator` directly in the store
pub async fn create_test_project(
    ctx: &TestContext,
    creator: Uuid,
    name: &str,
) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            name: name.to_string(),
            description: "Fixture project".to_string(),
            client: "Fixture client".to_string(),
            delivery_date: None,
        },
        creator,
    )
    .await?;

    Ok(project)
}

/// Creates a task inside `project_id` directly in the store
pub async fn create_test_task(
    ctx: &TestContext,
    project_id: Uuid,
    name: &str,
) -> anyhow::Result<Task> {
    let task = Task::create(
        &ctx.db,
        CreateTask {
            project_id,
            name: name.to_string(),
            description: "Fixture task".to_string(),
            priority: TaskPriority::Medium,
            delivery_date: None,
        },
    )
    .await?;

    Ok(task)
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&bytes).unwrap()
}

/// Filler so the context can be assembled before its first user exists
fn placeholder_user() -> User {
    User {
        id: Uuid::nil(),
        name: String::new(),
        email: String::new(),
        password_hash: String::new(),
        confirmed: false,
        token: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}
