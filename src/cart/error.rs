use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::pricing::PricingError;
use crate::promotions::PromotionError;

/// Error type for cart operations
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cart with id {0} not found")]
    CartNotFound(Uuid),

    #[error("Cart line with id {0} not found")]
    LineNotFound(Uuid),

    #[error("Product with id {0} not found")]
    ProductNotFound(i32),

    #[error("Promotion with id {0} not found")]
    PromotionNotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        CartError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        match self {
            CartError::Pricing(err) => err.into_response(),
            CartError::Promotion(err) => err.into_response(),
            CartError::DatabaseError(ref msg) => {
                tracing::error!("Database error in cart operation: {}", msg);
                let body = Json(json!({"error": "Database error"}));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            CartError::CartNotFound(_)
            | CartError::LineNotFound(_)
            | CartError::ProductNotFound(_)
            | CartError::PromotionNotFound(_) => {
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            CartError::ValidationError(_) => {
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        let error = CartError::CartNotFound(id);
        assert_eq!(
            error.to_string(),
            format!("Cart with id {} not found", id)
        );
    }

    #[test]
    fn test_pricing_errors_pass_through_status() {
        let error = CartError::Pricing(PricingError::InsufficientStock {
            requested: 5,
            available: 2,
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
