/// Personal access token records
///
/// Every bearer token handed to a client has a row here. The token itself is a
/// signed JWT whose `jti` claim is the row ID; the row is what makes the token
/// revocable. Logging out deletes the row, logging in deletes all of the
/// user's rows before issuing a new one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE personal_access_tokens (
///     id UUID PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     last_used_at TIMESTAMPTZ,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name given to tokens issued by register/login
pub const DEFAULT_TOKEN_NAME: &str = "auth_token";

/// Server-side record of an issued token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessToken {
    /// Token ID, carried in the JWT `jti` claim
    pub id: Uuid,

    /// Token owner
    pub user_id: i64,

    /// Label for the token
    pub name: String,

    /// Last time the token authenticated a request
    pub last_used_at: Option<DateTime<Utc>>,

    /// Hard expiry, mirrors the JWT `exp` claim
    pub expires_at: DateTime<Utc>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Checks expiry against the current time
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Records a new token for a user
    pub async fn issue(
        pool: &PgPool,
        user_id: i64,
        name: &str,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO personal_access_tokens (id, user_id, name, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, last_used_at, expires_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(Utc::now() + ttl)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Looks up a live token and stamps `last_used_at`
    ///
    /// Returns `None` if the token was revoked, has expired, or belongs to a
    /// different user than the one named in the JWT.
    pub async fn find_active(
        pool: &PgPool,
        id: Uuid,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            UPDATE personal_access_tokens
            SET last_used_at = NOW()
            WHERE id = $1
              AND user_id = $2
              AND expires_at > NOW()
            RETURNING id, user_id, name, last_used_at, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Revokes a single token
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token a user holds
    ///
    /// Returns the number of tokens removed.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
