/// Project and task registry
///
/// The registry is the only write path for projects, tasks, and the
/// collaborator roster. Every mutation follows the same discipline:
///
/// 1. open a transaction and row-lock the governing project
/// 2. run the permission checks against that locked state
/// 3. apply the write and commit
/// 4. only then hand the change to the realtime hub
///
/// Because the lock covers both the check and the write, a concurrent
/// roster change or project deletion cannot slip in between them. And
/// because events go out after commit, a session never hears about a
/// change that later rolled back; a room with no listeners simply drops
/// the event without affecting the mutation.
///
/// Reads skip the transaction machinery and query the pool directly.
mod projects;
mod tasks;

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::auth::authorization::AccessError;
use crate::realtime::RoomHub;

/// Registry operation errors
///
/// `*NotFound` variants map to HTTP 404, `Access` to 403. Database
/// errors are surfaced for the API layer to log and normalize.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Project not found")]
    ProjectNotFound,

    #[error("Task not found")]
    TaskNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle to the registry
///
/// Cheap to clone; all clones share the pool and the realtime hub.
#[derive(Clone)]
pub struct Registry {
    pool: PgPool,
    rooms: Arc<RoomHub>,
}

impl Registry {
    pub fn new(pool: PgPool, rooms: Arc<RoomHub>) -> Self {
        Self { pool, rooms }
    }
}
