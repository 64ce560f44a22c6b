use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Error types for promotion record operations
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Promotion {id} is malformed: {reason}")]
    Malformed { id: Uuid, reason: String },
}

impl From<sqlx::Error> for PromotionError {
    fn from(err: sqlx::Error) -> Self {
        PromotionError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PromotionError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            PromotionError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            PromotionError::Malformed { id, reason } => {
                // A malformed row is a data problem, not a client problem.
                tracing::error!("Malformed promotion {}: {}", id, reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Promotion data is invalid".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
