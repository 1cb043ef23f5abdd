/// API error handling
///
/// Every error leaves the API as a JSON body of the shape
/// `{ "msg": "..." }` with a status that tells the client what kind of
/// failure it was:
///
/// - 400 - the request itself is bad (validation, duplicate registration)
/// - 401 - missing or unusable session token
/// - 403 - authenticated but not allowed
/// - 404 - the entity does not exist, or the caller may not know it does
/// - 500 - something unexpected; details go to the log, not the client
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use workroom_shared::auth::authorization::AccessError;
use workroom_shared::auth::jwt::JwtError;
use workroom_shared::auth::password::PasswordError;
use workroom_shared::registry::RegistryError;

/// An error ready to be rendered as an HTTP response
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

/// The JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                // Log the real cause; the client gets a generic message
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { msg })).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProjectNotFound
            | RegistryError::TaskNotFound
            | RegistryError::UserNotFound => ApiError::NotFound(err.to_string()),
            RegistryError::Access(access) => ApiError::from(access),
            RegistryError::Database(db) => ApiError::Internal(db.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired | JwtError::Invalid(_) => {
                ApiError::Unauthorized("Invalid token".to_string())
            }
            JwtError::Creation(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first human-readable message; the field order is
        // not significant
        let msg = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());

        ApiError::BadRequest(msg)
    }
}
