/// Request authentication
///
/// Turns an `Authorization: Bearer <token>` header into an [`AuthContext`].
/// A token is accepted when the JWT verifies and its access token row still
/// exists, belongs to the token's subject, and has not expired.
///
/// # Request Extensions
///
/// The API server's auth layer inserts the resulting `AuthContext` into the
/// request extensions; handlers pull it out with `Extension<AuthContext>`.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use kanban_shared::auth::middleware::{authenticate, bearer_token};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
/// let token = bearer_token(&headers)?;
/// let auth = authenticate(&pool, "jwt-secret", token).await?;
/// println!("principal: user {}", auth.user_id);
/// # Ok(())
/// # }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::access_token::AccessToken;

/// The authenticated principal of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: i64,

    /// Access token used for this request, revoked on logout
    pub token_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: i64, token_id: Uuid) -> Self {
        Self { user_id, token_id }
    }
}

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    Revoked,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            other => (StatusCode::UNAUTHORIZED, other.to_string()).into_response(),
        }
    }
}

/// Extracts the raw token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Verifies a bearer token and resolves the principal
///
/// The JWT is checked first so forged or expired tokens never reach the
/// database.
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    token: &str,
) -> Result<AuthContext, AuthError> {
    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    let user_id = claims
        .user_id()
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let record = AccessToken::find_active(pool, claims.jti, user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::Revoked)?;

    tracing::debug!(user_id, token_id = %record.id, "Authenticated request");

    Ok(AuthContext::new(user_id, record.id))
}
