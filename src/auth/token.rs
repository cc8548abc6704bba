use std::fmt;

use crate::error::AppError;
use crate::models::User;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims of a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// User name at sign-in time.
    pub name: String,
    /// Anti-forgery token of this session. Mutating forms must echo it back.
    pub csrf: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing secret and lifetime of session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl_minutes: i64,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Issues a session token for `user`, valid for the configured lifetime, with a fresh
/// anti-forgery token.
///
/// # Returns
/// The signed token, or `AppError::InternalServerError` if encoding fails.
pub fn generate_token(keys: &SessionKeys, user: &User) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::minutes(keys.ttl_minutes))
        .ok_or_else(|| AppError::InternalServerError("Session lifetime overflows".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        name: user.username.clone(),
        csrf: Uuid::new_v4().simple().to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a session token and decodes its claims.
///
/// # Returns
/// `AppError::Unauthorized` if the token is malformed, its signature is invalid, or it has
/// expired.
pub fn verify_token(keys: &SessionKeys, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
