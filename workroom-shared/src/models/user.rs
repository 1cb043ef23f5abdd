/// User model and database operations
///
/// A user is an account identity. Accounts start unconfirmed and carry a
/// one-shot `token` that drives both email confirmation and password reset;
/// consuming the token clears it so it can never be replayed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     token VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use workroom_shared::models::user::{CreateUser, User};
///
/// # async fn example(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     pool,
///     CreateUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "argon2-hash".to_string(),
///         token: "one-shot-token".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Login email, unique across the system
    pub email: String,

    /// Argon2 hash of the password, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the account has confirmed its email
    pub confirmed: bool,

    /// One-shot confirmation or password-reset token, never serialized
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

/// The public projection of a user, safe to show to other members
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Input for creating a user
///
/// The password is hashed and the one-shot token generated before this
/// struct is built; the model layer stores them as given.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token: String,
}

impl User {
    /// Creates a new, unconfirmed user
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Database` with a unique violation if the
    /// email is already registered.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, confirmed, token,
                      created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.token)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(
        conn: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, confirmed, token,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Finds a user by email
    pub async fn find_by_email(
        conn: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, confirmed, token,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await
    }

    /// Finds a user holding the given one-shot token
    pub async fn find_by_token(
        conn: impl PgExecutor<'_>,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, confirmed, token,
                   created_at, updated_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(conn)
        .await
    }

    /// Marks the account confirmed and consumes its token
    ///
    /// # Returns
    ///
    /// `true` if a row was updated, `false` if the user does not exist.
    pub async fn confirm(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET confirmed = TRUE, token = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a fresh one-shot token, replacing any previous one
    pub async fn set_token(pool: &PgPool, id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the password hash and consumes the reset token
    pub async fn set_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, token = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
