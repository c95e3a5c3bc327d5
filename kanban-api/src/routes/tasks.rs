/// Task endpoints
///
/// - `GET /v1/boards/:id/tasks` - Every task on a board, ordered by position
/// - `POST /v1/boards/:id/tasks` - Add a task to a board
/// - `GET /v1/tasks/:id` - One task
/// - `PUT /v1/tasks/:id` - Change title, description, status or order
/// - `DELETE /v1/tasks/:id` - Delete a task
/// - `POST /v1/tasks/reorder` - Replace the order of one column
///
/// Tasks have no policy of their own: every check runs against the parent
/// board. Status strings are parsed into [`TaskStatus`] at this boundary and
/// anything else is a `422`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ResourceId, ValidatedJson},
    routes::{boards::load_board, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use kanban_shared::{
    auth::{authorization::BoardAbility, middleware::AuthContext},
    models::task::{CreateTask, Task, TaskStatus, UpdateTask},
    reorder::{self, ReorderOutcome, ReorderRequest},
};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Body for `POST /v1/boards/:id/tasks`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "The title field is required and may not be greater than 255 characters."
    ))]
    pub title: String,

    pub description: Option<String>,

    /// Defaults to `todo`
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    /// Defaults to the end of the column
    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: Option<i32>,
}

/// Body for `PUT /v1/tasks/:id`; absent fields are left alone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The title may not be empty or greater than 255 characters."
    ))]
    pub title: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    #[validate(range(min = 0, message = "The order must be at least 0."))]
    pub order: Option<i32>,
}

/// Body for `POST /v1/tasks/reorder`
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderTasksRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: String,

    /// New column order; may be empty but must be present
    #[serde(rename = "taskIds")]
    #[validate(required(message = "The task ids field is required."))]
    pub task_ids: Option<Vec<i64>>,
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.parse::<TaskStatus>().is_ok() {
        return Ok(());
    }

    let mut error = ValidationError::new("status");
    error.message = Some(Cow::Borrowed(if status.is_empty() {
        "The status field is required."
    } else {
        "The selected status is invalid."
    }));
    Err(error)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    raw.parse::<TaskStatus>()
        .map_err(|e| ApiError::validation("status", e.to_string()))
}

/// Loads a task and checks `ability` against its board
async fn load_task(
    pool: &PgPool,
    auth: &AuthContext,
    task_id: i64,
    ability: BoardAbility,
) -> ApiResult<Task> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    load_board(pool, auth, task.board_id, ability).await?;

    Ok(task)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(board_id): ResourceId,
) -> ApiResult<Json<Vec<Task>>> {
    load_board(&state.db, &auth, board_id, BoardAbility::View).await?;

    let tasks = Task::list_by_board(&state.db, board_id).await?;

    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(board_id): ResourceId,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    load_board(&state.db, &auth, board_id, BoardAbility::Update).await?;

    let status = match req.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => TaskStatus::Todo,
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id,
            title: req.title,
            description: req.description,
            status,
            order: req.order,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        board_id,
        task_id = task.id,
        status = %task.status,
        order = task.order,
        "Created task"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(task_id): ResourceId,
) -> ApiResult<Json<Task>> {
    let task = load_task(&state.db, &auth, task_id, BoardAbility::View).await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(task_id): ResourceId,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = load_task(&state.db, &auth, task_id, BoardAbility::Update).await?;

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        status: req.status.as_deref().map(parse_status).transpose()?,
        order: req.order,
    };

    if update.is_empty() {
        return Ok(Json(task));
    }

    let task = Task::update(&state.db, task_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ResourceId(task_id): ResourceId,
) -> ApiResult<StatusCode> {
    load_task(&state.db, &auth, task_id, BoardAbility::Delete).await?;

    Task::delete(&state.db, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the order of one column
///
/// ```text
/// POST /v1/tasks/reorder
///
/// { "status": "in_progress", "taskIds": [5, 2, 8] }
/// ```
///
/// # Errors
///
/// - `403`: The board is not the caller's, or the IDs span several boards
/// - `404`: No ID (or not every ID) names an existing task
/// - `422`: Validation failed
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<ReorderTasksRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let request = ReorderRequest {
        status: parse_status(&req.status)?,
        task_ids: req.task_ids.unwrap_or_default(),
    };

    let message = match reorder::reorder_tasks(&state.db, &auth, &request).await? {
        ReorderOutcome::NothingToDo => "No tasks to reorder.",
        ReorderOutcome::Reordered { .. } => "Tasks reordered successfully.",
    };

    Ok(Json(MessageResponse::new(message)))
}
