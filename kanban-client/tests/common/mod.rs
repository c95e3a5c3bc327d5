/// In-process stub of the Kanban API
///
/// Serves just enough of the real surface for client tests: one user
/// (`alice@example.com` / `secret`) whose token is [`GOOD_TOKEN`], a single
/// board, and a reorder endpoint that records what it receives. Logout always
/// fails with a 500 so tests can check the session is dropped anyway.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use kanban_client::Session;
use kanban_shared::models::user::User;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const GOOD_TOKEN: &str = "good-token";
pub const PASSWORD: &str = "secret";

/// Requests the stub has seen
#[derive(Default)]
pub struct StubState {
    pub reorders: Mutex<Vec<Value>>,
    pub logouts: Mutex<usize>,
}

fn user_json() -> Value {
    json!({
        "id": 1,
        "name": "Alice",
        "email": "alice@example.com",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    })
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid token")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", GOOD_TOKEN))
        .unwrap_or(false)
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "alice@example.com" && body["password"] == PASSWORD {
        Json(json!({ "user": user_json(), "token": GOOD_TOKEN })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "unauthorized", "Incorrect login details")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "alice@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_error",
                "message": "Validation failed",
                "details": [{ "field": "email", "message": "The email has already been taken." }],
            })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({ "user": user_json(), "token": GOOD_TOKEN })),
    )
        .into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "user": user_json() })).into_response()
}

async fn logout(State(state): State<Arc<StubState>>) -> Response {
    *state.logouts.lock().unwrap() += 1;
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error")
}

async fn list_boards(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{
        "id": 5,
        "user_id": 1,
        "name": "Sprint 1",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    }]))
    .into_response()
}

async fn delete_board(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 5 {
        return error(StatusCode::NOT_FOUND, "not_found", "Board not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_task(headers: HeaderMap, Path(board_id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["title"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_error",
                "message": "Validation failed",
                "details": [{ "field": "title", "message": "The title field is required." }],
            })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "id": 100,
            "board_id": board_id,
            "title": body["title"],
            "description": body.get("description").cloned().unwrap_or(Value::Null),
            "status": body.get("status").cloned().unwrap_or_else(|| json!("todo")),
            "order": 0,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        })),
    )
        .into_response()
}

async fn reorder(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.reorders.lock().unwrap().push(body);
    Json(json!({ "message": "Tasks reordered successfully." })).into_response()
}

/// Starts the stub on an ephemeral port and returns its base URL
pub async fn spawn_stub() -> (String, Arc<StubState>) {
    let state = Arc::new(StubState::default());

    let app = Router::new()
        .route("/v1/status", get(status))
        .route("/v1/login", post(login))
        .route("/v1/register", post(register))
        .route("/v1/user", get(current_user))
        .route("/v1/logout", post(logout))
        .route("/v1/boards", get(list_boards))
        .route("/v1/boards/:id", delete(delete_board))
        .route("/v1/boards/:id/tasks", post(create_task))
        .route("/v1/tasks/reorder", post(reorder))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

/// A stored session carrying `token`
#[allow(dead_code)]
pub fn stored_session(token: &str) -> Session {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    Session {
        user: User {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            created_at: at,
            updated_at: at,
        },
        token: token.to_string(),
    }
}
