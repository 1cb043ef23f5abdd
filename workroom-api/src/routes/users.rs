/// Account routes
///
/// Registration, email confirmation, login, password reset, and the
/// profile read. Everything except `/users/profile` is reachable without
/// a session, because these flows exist to get the user a session in the
/// first place.
///
/// Emails are dispatched on a background task; a broken mail provider
/// must never fail the account flow that triggered it.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use workroom_shared::auth::password::{hash_password, verify_password};
use workroom_shared::auth::tokens::generate_account_token;
use workroom_shared::auth::{jwt, Principal};
use workroom_shared::models::user::{CreateUser, User};

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::MessageResponse;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub password: String,
}

/// Login response: the profile plus a fresh session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Password reset request (step one: which account)
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Password reset request (step two: the new password)
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// POST /users
///
/// Creates an unconfirmed account and mails the confirmation link.
/// Registering an email that already exists is a 400.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    request.validate()?;

    if User::find_by_email(&state.db, &request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("User already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let token = generate_account_token();

    let user = User::create(
        &state.db,
        CreateUser {
            name: request.name,
            email: request.email,
            password_hash,
            token: token.clone(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_registration_email(&user.name, &user.email, &token)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send confirmation email");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Account created, check your email to confirm it",
        )),
    ))
}

/// POST /users/login
///
/// Unknown email is a 404; an unconfirmed account or a wrong password is
/// a 403. Success returns the profile with a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let user = User::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    if !user.confirmed {
        return Err(ApiError::Forbidden(
            "Your account has not been confirmed".to_string(),
        ));
    }

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::Forbidden("Wrong password".to_string()));
    }

    let token = jwt::create_token(user.id, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

/// GET /users/confirm/:token
///
/// Confirms the account holding this token and consumes the token.
pub async fn confirm_account(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = User::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Invalid token".to_string()))?;

    User::confirm(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "Account confirmed");

    Ok(Json(MessageResponse::new(
        "Account confirmed, you can now log in",
    )))
}

/// POST /users/forgot-password
///
/// Issues a fresh one-shot token and mails the reset link. Unknown
/// email is a 404.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    let user = User::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User is not registered".to_string()))?;

    let token = generate_account_token();
    User::set_token(&state.db, user.id, &token).await?;

    tracing::info!(user_id = %user.id, "Password reset requested");

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_password_reset_email(&user.name, &user.email, &token)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }
    });

    Ok(Json(MessageResponse::new(
        "We have sent an email with instructions",
    )))
}

/// GET /users/forgot-password/:token
///
/// Checks that a reset token is still valid, without consuming it.
pub async fn check_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    User::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Invalid token".to_string()))?;

    Ok(Json(MessageResponse::new(
        "Valid token, set your new password",
    )))
}

/// POST /users/forgot-password/:token
///
/// Sets the new password and consumes the token.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    let user = User::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Invalid token".to_string()))?;

    let password_hash = hash_password(&request.password)?;
    User::set_password(&state.db, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password updated");

    Ok(Json(MessageResponse::new("Password updated")))
}

/// GET /users/profile
///
/// The authenticated caller's own profile, exactly as the middleware
/// resolved it.
pub async fn profile(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}
