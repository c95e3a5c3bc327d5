/// Liveness endpoint
///
/// ```text
/// GET /v1/status  ->  200 {"status":"OK"}
/// ```
///
/// Never touches the database; use `/health` for readiness.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}
