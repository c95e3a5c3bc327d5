/// Ownership policy for boards and tasks
///
/// Single-owner model: a principal may view, update or delete a board if and
/// only if they own it. Tasks have no policy of their own; every task check
/// is a check against the task's parent board.
///
/// Handlers call [`authorize`] before touching the database for writes, and
/// map [`AuthzError::Forbidden`] to `403`.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use kanban_shared::auth::authorization::{authorize, can_view, BoardAbility};
/// use kanban_shared::auth::middleware::AuthContext;
/// use kanban_shared::models::board::Board;
/// use uuid::Uuid;
///
/// let owner = AuthContext::new(1, Uuid::new_v4());
/// let stranger = AuthContext::new(2, Uuid::new_v4());
/// let board = Board {
///     id: 10,
///     user_id: 1,
///     name: "Sprint 1".to_string(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// assert!(can_view(&owner, &board));
/// assert!(authorize(&stranger, BoardAbility::Delete, &board).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::board::Board;

/// Authorization errors
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Not authorized to {ability} board {board_id}")]
    Forbidden { ability: BoardAbility, board_id: i64 },
}

/// Actions a principal can take on a board (and, through it, its tasks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAbility {
    View,
    Update,
    Delete,
}

impl std::fmt::Display for BoardAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BoardAbility::View => "view",
            BoardAbility::Update => "update",
            BoardAbility::Delete => "delete",
        })
    }
}

fn is_owner(principal: &AuthContext, board: &Board) -> bool {
    board.user_id == principal.user_id
}

/// Decides whether `principal` may perform `ability` on `board`
pub fn can(principal: &AuthContext, ability: BoardAbility, board: &Board) -> bool {
    match ability {
        BoardAbility::View | BoardAbility::Update | BoardAbility::Delete => {
            is_owner(principal, board)
        }
    }
}

pub fn can_view(principal: &AuthContext, board: &Board) -> bool {
    can(principal, BoardAbility::View, board)
}

pub fn can_update(principal: &AuthContext, board: &Board) -> bool {
    can(principal, BoardAbility::Update, board)
}

pub fn can_delete(principal: &AuthContext, board: &Board) -> bool {
    can(principal, BoardAbility::Delete, board)
}

/// Like [`can`], but returns an error suitable for `?`
pub fn authorize(
    principal: &AuthContext,
    ability: BoardAbility,
    board: &Board,
) -> Result<(), AuthzError> {
    if can(principal, ability, board) {
        return Ok(());
    }

    tracing::warn!(
        user_id = principal.user_id,
        board_id = board.id,
        %ability,
        "Authorization denied"
    );

    Err(AuthzError::Forbidden {
        ability,
        board_id: board.id,
    })
}
