/// Board endpoints
///
/// - `GET /v1/boards` - The caller's boards, newest first
/// - `POST /v1/boards` - Create a board
/// - `GET /v1/boards/:id` - One board
/// - `PUT /v1/boards/:id` - Rename a board
/// - `DELETE /v1/boards/:id` - Delete a board and all its tasks
///
/// Boards are returned as bare JSON objects (arrays for lists). A missing board
/// is `404`; someone else's board is `403`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ResourceId, ValidatedJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use kanban_shared::{
    auth::{
        authorization::{authorize, BoardAbility},
        middleware::AuthContext,
    },
    models::board::{Board, CreateBoard, UpdateBoard},
};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

/// Body for create and update
#[derive(Debug, Deserialize, Validate)]
pub struct BoardRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "The name field is required and may not be greater than 255 characters."
    ))]
    pub name: String,
}

/// Loads a board and checks `ability` against it
pub(crate) async fn load_board(
    pool: &PgPool,
    auth: &AuthContext,
    board_id: i64,
    ability: BoardAbility,
) -> ApiResult<Board> {
    let board = Board::find_by_id(pool, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    authorize(auth, ability, &board)?;

    Ok(board)
}

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Board>>> {
    let boards = Board::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<BoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = Board::create(
        &state.db,
        CreateBoard {
            user_id: auth.user_id,
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = auth.user_id, board_id = board.id, "Created board");

    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(board_id): ResourceId,
) -> ApiResult<Json<Board>> {
    let board = load_board(&state.db, &auth, board_id, BoardAbility::View).await?;

    Ok(Json(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(board_id): ResourceId,
    ValidatedJson(req): ValidatedJson<BoardRequest>,
) -> ApiResult<Json<Board>> {
    load_board(&state.db, &auth, board_id, BoardAbility::Update).await?;

    let board = Board::update(
        &state.db,
        board_id,
        UpdateBoard {
            name: Some(req.name),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(board_id): ResourceId,
) -> ApiResult<StatusCode> {
    load_board(&state.db, &auth, board_id, BoardAbility::Delete).await?;

    Board::delete(&state.db, board_id).await?;

    tracing::info!(user_id = auth.user_id, board_id, "Deleted board");

    Ok(StatusCode::NO_CONTENT)
}
