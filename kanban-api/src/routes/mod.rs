/// API route handlers, one module per resource
///
/// - `status`: Liveness ping
/// - `health`: Readiness with database check
/// - `auth`: Register, login, current user, logout
/// - `boards`: Board CRUD
/// - `tasks`: Task CRUD and reordering

pub mod auth;
pub mod boards;
pub mod health;
pub mod status;
pub mod tasks;

use serde::{Deserialize, Serialize};

/// `{"message": "..."}` body for endpoints with nothing else to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
