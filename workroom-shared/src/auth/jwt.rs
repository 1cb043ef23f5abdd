/// Session tokens
///
/// Login issues a single HS256-signed JWT that identifies the user for
/// 30 days. The token carries only the user ID; name and email are
/// loaded fresh on every request so profile edits take effect
/// immediately.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token issuer claim
const ISSUER: &str = "workroom";

/// How long a session token stays valid
const TOKEN_LIFETIME_DAYS: i64 = 30;

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    /// The token's expiry has passed
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, or structure problems
    #[error("Token is invalid: {0}")]
    Invalid(String),

    /// Signing failed
    #[error("Failed to create token: {0}")]
    Creation(String),
}

/// Claims carried in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID the token was issued to
    pub sub: Uuid,

    /// Issuer, always `"workroom"`
    pub iss: String,

    /// Issued-at, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,

    /// Not-before, seconds since the epoch
    pub nbf: i64,
}

impl Claims {
    /// Builds claims for a user with the standard lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_lifetime(user_id, Duration::days(TOKEN_LIFETIME_DAYS))
    }

    /// Builds claims with an explicit lifetime
    pub fn with_lifetime(user_id: Uuid, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Whether the expiry has passed
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

/// Signs a session token for a user
pub fn create_token(user_id: Uuid, secret: &str) -> Result<String, JwtError> {
    let claims = Claims::new(user_id);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Creation(e.to_string()))
}

/// Validates a session token and returns its claims
///
/// Checks the signature, expiry, not-before, and issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(data.claims)
}
