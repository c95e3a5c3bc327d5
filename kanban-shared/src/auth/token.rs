/// Token issuance
///
/// Issuing a token writes the access token row first and then signs a JWT
/// that points at it, so every token a client holds can be revoked.

use chrono::Duration;
use sqlx::PgPool;

use super::jwt::{create_token, Claims, JwtError};
use crate::models::access_token::{AccessToken, DEFAULT_TOKEN_NAME};

/// Token issuance errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// A freshly issued bearer token and its server-side record
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub record: AccessToken,
    pub token: String,
}

/// Issues a new bearer token for a user
pub async fn issue_token(
    pool: &PgPool,
    user_id: i64,
    secret: &str,
    ttl: Duration,
) -> Result<IssuedToken, TokenError> {
    let record = AccessToken::issue(pool, user_id, DEFAULT_TOKEN_NAME, ttl).await?;
    let claims = Claims::new(user_id, record.id, ttl);
    let token = create_token(&claims, secret)?;

    tracing::debug!(user_id, token_id = %record.id, "Issued access token");

    Ok(IssuedToken { record, token })
}

/// Revokes every token of a user and issues a single new one
///
/// Used by login: a user has at most one live session after signing in.
pub async fn rotate_tokens(
    pool: &PgPool,
    user_id: i64,
    secret: &str,
    ttl: Duration,
) -> Result<IssuedToken, TokenError> {
    let revoked = AccessToken::revoke_all_for_user(pool, user_id).await?;
    if revoked > 0 {
        tracing::info!(user_id, revoked, "Revoked previous access tokens");
    }

    issue_token(pool, user_id, secret, ttl).await
}
