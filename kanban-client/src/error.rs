/// Client error types
///
/// Non-2xx responses from the API become [`ClientError::Api`], carrying the
/// status plus the `{error, message, details}` body the server renders.
/// Everything else is transport, decoding, or session storage trouble.

use reqwest::StatusCode;
use serde::Deserialize;

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub details: Vec<FieldError>,
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Vec<FieldError>,
    },

    /// The call needs a session and there is none
    #[error("Not logged in")]
    NotAuthenticated,

    /// Base URL could not be parsed
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session storage failed
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Builds an [`ClientError::Api`] from a failed response body
    ///
    /// Bodies that are not the API's error shape keep the raw text (or the
    /// status reason when empty) as the message.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                message: parsed.message,
                details: parsed.details,
            },
            Err(_) => ClientError::Api {
                status,
                message: if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body.to_string()
                },
                details: Vec::new(),
            },
        }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// First validation message for `field`, if any
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            ClientError::Api { details, .. } => details
                .iter()
                .find(|d| d.field == field)
                .map(|d| d.message.as_str()),
            _ => None,
        }
    }
}

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_parses_api_body() {
        let body = r#"{
            "error": "validation_error",
            "message": "Validation failed",
            "details": [{"field": "title", "message": "The title field is required."}]
        }"#;

        let err = ClientError::from_response(StatusCode::UNPROCESSABLE_ENTITY, body);

        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.field_message("title"), Some("The title field is required."));
        assert_eq!(err.field_message("status"), None);
        assert_eq!(err.to_string(), "API error (422 Unprocessable Entity): Validation failed");
    }

    #[test]
    fn test_from_response_without_details() {
        let body = r#"{"error": "forbidden", "message": "Forbidden"}"#;
        let err = ClientError::from_response(StatusCode::FORBIDDEN, body);

        match err {
            ClientError::Api { message, details, .. } => {
                assert_eq!(message, "Forbidden");
                assert!(details.is_empty());
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_response_falls_back_to_text() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "upstream down"));

        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::from_response(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(!ClientError::NotAuthenticated.is_unauthorized());
    }
}
