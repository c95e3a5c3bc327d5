/// Database models for the Kanban board
///
/// Each model owns its SQL. Functions take a `&PgPool` and return
/// `sqlx::Error` so callers decide how failures map to responses.
///
/// # Models
///
/// - `user`: accounts
/// - `access_token`: revocable records behind issued bearer tokens
/// - `board`: boards owned by a user
/// - `task`: cards inside a board, with status column and position
///
/// # Example
///
/// ```no_run
/// use kanban_shared::models::board::{Board, CreateBoard};
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let board = Board::create(&pool, CreateBoard {
///     user_id: 1,
///     name: "Sprint 1".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod access_token;
pub mod board;
pub mod task;
pub mod user;
