/// Board model and database operations
///
/// A board is a named collection of tasks owned by exactly one user. Deleting a
/// board deletes its tasks through the `ON DELETE CASCADE` foreign key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Board owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: i64,

    /// Owner
    pub user_id: i64,

    /// Display name
    pub name: String,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last renamed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
///
/// The owner always comes from the authenticated principal, never from the
/// request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    pub user_id: i64,
    pub name: String,
}

/// Input for updating a board
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    pub name: Option<String>,
}

impl Board {
    /// Creates a board for a user
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID regardless of owner
    ///
    /// Handlers distinguish "does not exist" (404) from "not yours" (403), so
    /// the owner check happens in the policy layer rather than in this query.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists a user's boards, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM boards
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Updates a board
    ///
    /// Returns `None` if the board no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Deletes a board and, by cascade, all of its tasks
    ///
    /// Returns true if the board existed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of tasks on a board, across all columns
    pub async fn count_tasks(pool: &PgPool, id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE board_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_serialization() {
        let board = Board {
            id: 1,
            user_id: 42,
            name: "Sprint 1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&board).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["user_id"], 42);
        assert_eq!(value["name"], "Sprint 1");
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_update_board_default_changes_nothing() {
        let update = UpdateBoard::default();
        assert!(update.name.is_none());
    }
}
