// Error types for the pricing engine
//
// PricingError is pure: every variant is recoverable at the call site and
// none is produced by I/O. Expired or inactive promotions are not an error
// at all; the promotion index silently drops them and pricing proceeds as
// "no promotion".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Error type for pricing engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Requested quantity was zero or negative
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// A multi-unit product has no active unit; callers fall back to the
    /// synthesized base unit
    #[error("Product {0} has no active units")]
    EmptyCatalog(i32),

    /// The requested unit does not belong to the product or is inactive
    #[error("Unit {0} is not purchasable for this product")]
    UnknownUnit(i32),

    /// Requested packs exceed the stock converted through pack_qty
    #[error("Insufficient stock: requested {requested} packs, {available} available")]
    InsufficientStock { requested: i32, available: i32 },

    /// Combo pick total does not equal the required item count
    #[error("Combo requires exactly {required} picks, got {picked}")]
    ComboIncomplete { required: i32, picked: i32 },

    /// A combo pick references a unit outside the promotion's pool
    #[error("Unit {0} is not part of the combo pool")]
    InvalidComboItem(i32),

    /// A promotion variant reached a code path that cannot price it (e.g. an
    /// assorted bundle handed to the per-unit calculator)
    #[error("Promotion {0} cannot be priced on this path")]
    WrongPromotionKind(Uuid),
}

impl PricingError {
    /// HTTP status for this error when surfaced through a quote endpoint
    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            PricingError::EmptyCatalog(_) => StatusCode::NOT_FOUND,
            PricingError::UnknownUnit(_) => StatusCode::BAD_REQUEST,
            PricingError::InsufficientStock { .. } => StatusCode::CONFLICT,
            PricingError::ComboIncomplete { .. } => StatusCode::BAD_REQUEST,
            PricingError::InvalidComboItem(_) => StatusCode::BAD_REQUEST,
            PricingError::WrongPromotionKind(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
