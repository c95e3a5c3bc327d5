/// Task reordering
///
/// A drop on the client sends the full post-drop sequence of one column:
/// a target status and an ordered list of task IDs. Reordering replaces the
/// `(status, order)` of exactly those tasks with `(status, index)`, all inside
/// one transaction. Tasks not named in the request keep their values, so
/// positions in a column may end up with gaps; that is accepted.
///
/// # Checks
///
/// In order, before anything is written:
///
/// 1. An empty list is a successful no-op.
/// 2. No ID resolves to a task → [`ReorderError::NoTasksFound`].
/// 3. The board of the first resolved ID must be updatable by the principal
///    → otherwise [`ReorderError::Forbidden`].
/// 4. Every resolved task must sit on that same board → otherwise
///    [`ReorderError::CrossBoard`]. This stops a caller from slipping another
///    user's task IDs in next to their own.
/// 5. Every requested ID must resolve → otherwise
///    [`ReorderError::TasksNotFound`].
///
/// The resolved rows are locked with `FOR UPDATE`, and a row that still
/// vanishes before its update ([`ReorderError::TaskVanished`]) rolls the whole
/// batch back.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::auth::middleware::AuthContext;
/// use kanban_shared::models::task::TaskStatus;
/// use kanban_shared::reorder::{reorder_tasks, ReorderRequest};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, principal: AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// let request = ReorderRequest {
///     status: TaskStatus::Done,
///     task_ids: vec![3, 1, 2],
/// };
///
/// // Afterwards: 3 -> order 0, 1 -> order 1, 2 -> order 2, all done
/// reorder_tasks(&pool, &principal, &request).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;

use crate::auth::authorization::{authorize, AuthzError, BoardAbility};
use crate::auth::middleware::AuthContext;
use crate::models::board::Board;
use crate::models::task::TaskStatus;

/// A column's new content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Column every listed task moves into
    pub status: TaskStatus,

    /// Task IDs in their new display order
    #[serde(rename = "taskIds")]
    pub task_ids: Vec<i64>,
}

/// What a successful reorder did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The request listed no tasks
    NothingToDo,

    /// `count` tasks on `board_id` were rewritten
    Reordered { board_id: i64, count: usize },
}

/// Reorder failures
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error("No valid tasks found")]
    NoTasksFound,

    #[error("Tasks not found: {0:?}")]
    TasksNotFound(Vec<i64>),

    #[error("Cannot reorder tasks from different boards")]
    CrossBoard,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("Task {0} was removed while reordering")]
    TaskVanished(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Minimal view of a task needed to validate a reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ResolvedTask {
    pub id: i64,
    pub board_id: i64,
}

/// One row's new status and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task_id: i64,
    pub status: TaskStatus,
    pub order: i32,
}

/// Computes the placements for a request: each ID gets its 0-based index
///
/// A repeated ID appears once per occurrence; the later placement wins when
/// applied in sequence.
pub fn plan(status: TaskStatus, task_ids: &[i64]) -> Vec<Placement> {
    task_ids
        .iter()
        .enumerate()
        .map(|(index, &task_id)| Placement {
            task_id,
            status,
            order: i32::try_from(index).unwrap_or(i32::MAX),
        })
        .collect()
}

/// Picks the board a reorder applies to
///
/// That is the board of the first requested ID that resolved. Fails with
/// [`ReorderError::NoTasksFound`] if nothing resolved.
pub fn target_board(requested: &[i64], resolved: &[ResolvedTask]) -> Result<i64, ReorderError> {
    requested
        .iter()
        .find_map(|id| resolved.iter().find(|task| task.id == *id))
        .map(|task| task.board_id)
        .ok_or(ReorderError::NoTasksFound)
}

/// Ensures every resolved task sits on `board_id`
pub fn ensure_single_board(resolved: &[ResolvedTask], board_id: i64) -> Result<(), ReorderError> {
    if resolved.iter().all(|task| task.board_id == board_id) {
        Ok(())
    } else {
        Err(ReorderError::CrossBoard)
    }
}

/// Requested IDs that did not resolve, in request order without repeats
pub fn missing_ids(requested: &[i64], resolved: &[ResolvedTask]) -> Vec<i64> {
    let found: HashSet<i64> = resolved.iter().map(|task| task.id).collect();
    let mut seen = HashSet::new();

    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id) && seen.insert(*id))
        .collect()
}

/// Applies a reorder request on behalf of `principal`
///
/// See the module docs for the order of checks. All reads and writes share one
/// transaction; any error drops it, which rolls back.
pub async fn reorder_tasks(
    pool: &PgPool,
    principal: &AuthContext,
    request: &ReorderRequest,
) -> Result<ReorderOutcome, ReorderError> {
    if request.task_ids.is_empty() {
        return Ok(ReorderOutcome::NothingToDo);
    }

    let mut tx = pool.begin().await?;

    let resolved = sqlx::query_as::<_, ResolvedTask>(
        r#"
        SELECT id, board_id
        FROM tasks
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&request.task_ids)
    .fetch_all(&mut *tx)
    .await?;

    let board_id = target_board(&request.task_ids, &resolved)?;

    let board = sqlx::query_as::<_, Board>(
        r#"
        SELECT id, user_id, name, created_at, updated_at
        FROM boards
        WHERE id = $1
        "#,
    )
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ReorderError::NoTasksFound)?;

    authorize(principal, BoardAbility::Update, &board)?;
    ensure_single_board(&resolved, board_id)?;

    let missing = missing_ids(&request.task_ids, &resolved);
    if !missing.is_empty() {
        return Err(ReorderError::TasksNotFound(missing));
    }

    let placements = plan(request.status, &request.task_ids);

    for placement in &placements {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $1,
                position = $2,
                updated_at = NOW()
            WHERE id = $3 AND board_id = $4
            "#,
        )
        .bind(placement.status)
        .bind(placement.order)
        .bind(placement.task_id)
        .bind(board_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ReorderError::TaskVanished(placement.task_id));
        }
    }

    tx.commit().await?;

    tracing::info!(
        user_id = principal.user_id,
        board_id,
        status = %request.status,
        count = placements.len(),
        "Reordered tasks"
    );

    Ok(ReorderOutcome::Reordered {
        board_id,
        count: placements.len(),
    })
}
