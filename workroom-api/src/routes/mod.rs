/// API route handlers
///
/// - `users` - registration, confirmation, login, password reset, profile
/// - `projects` - project CRUD and the collaborator roster
/// - `tasks` - task CRUD and the status toggle
/// - `ws` - the realtime WebSocket endpoint
/// - `health` - liveness probe
use serde::Serialize;

pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod ws;

/// Body for endpoints whose result is just an outcome message
///
/// Mirrors the error shape, so clients read `msg` either way.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
