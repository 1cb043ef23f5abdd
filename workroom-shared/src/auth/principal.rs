/// The authenticated caller
///
/// Built by the API's auth middleware after validating the session token
/// and loading the user row, then attached to the request for handlers
/// to pick up. Also the body of `GET /users/profile`.
use serde::Serialize;
use uuid::Uuid;

use crate::models::user::User;

/// Identity attached to every authenticated request
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
