// HTTP handlers for advisory quote endpoints
//
// These endpoints price a hypothetical purchase without touching a cart.
// The order backend independently re-validates pricing at submission; a
// quote is display-layer output, not a reservation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::CatalogError;
use crate::pricing::types::{ComboPick, ComboResult, Quote};
use crate::pricing::PricingError;
use crate::promotions::PromotionError;

/// Request body for POST /api/pricing/quote
#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    pub product_id: i32,
    /// Omit to price the product's default unit
    pub unit_id: Option<i32>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request body for POST /api/pricing/combo-quote
#[derive(Debug, Deserialize, Validate)]
pub struct ComboQuoteRequest {
    pub promotion_id: Uuid,
    #[validate(length(min = 1, message = "At least one pick is required"))]
    pub picks: Vec<ComboPick>,
}

/// Error type for the quote endpoints: engine errors plus the fetch glue
/// around them
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("{0}")]
    Pricing(#[from] PricingError),

    #[error("Product with id {0} not found")]
    ProductNotFound(i32),

    #[error("Promotion with id {0} not found")]
    PromotionNotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        match self {
            QuoteError::Pricing(err) => err.into_response(),
            QuoteError::Catalog(err) => err.into_response(),
            QuoteError::Promotion(err) => err.into_response(),
            QuoteError::ProductNotFound(_) | QuoteError::PromotionNotFound(_) => {
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            QuoteError::ValidationError(_) => {
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

/// Handler for POST /api/pricing/quote
pub async fn quote_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Quote>, QuoteError> {
    request
        .validate()
        .map_err(|e| QuoteError::ValidationError(e.to_string()))?;

    tracing::debug!(
        "Quote requested: product {} unit {:?} qty {}",
        request.product_id,
        request.unit_id,
        request.quantity
    );

    let product = state
        .products
        .find_by_id(request.product_id)
        .await?
        .ok_or(QuoteError::ProductNotFound(request.product_id))?;

    let units = state.product_units.find_by_product(request.product_id).await?;

    let promotions = state.promotions.find_for_product(request.product_id).await?;

    let quote = state.pricing.quote(
        &product,
        &units,
        promotions,
        request.unit_id,
        request.quantity,
        Utc::now(),
    )?;

    Ok(Json(quote))
}

/// Handler for POST /api/pricing/combo-quote
pub async fn combo_quote_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<ComboQuoteRequest>,
) -> Result<Json<ComboResult>, QuoteError> {
    request
        .validate()
        .map_err(|e| QuoteError::ValidationError(e.to_string()))?;

    tracing::debug!(
        "Combo quote requested: promotion {} with {} picks",
        request.promotion_id,
        request.picks.len()
    );

    let promotion = state
        .promotions
        .find_by_id(request.promotion_id)
        .await?
        .ok_or(QuoteError::PromotionNotFound(request.promotion_id))?;

    let result = state
        .pricing
        .quote_combo(
            vec![promotion],
            request.promotion_id,
            &request.picks,
            Utc::now(),
        )?
        .ok_or(QuoteError::PromotionNotFound(request.promotion_id))?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_request_rejects_zero_quantity() {
        let request = QuoteRequest {
            product_id: 1,
            unit_id: None,
            quantity: 0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_combo_request_rejects_empty_picks() {
        let request = ComboQuoteRequest {
            promotion_id: Uuid::new_v4(),
            picks: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_pricing_errors_keep_their_status() {
        let err = QuoteError::Pricing(PricingError::InsufficientStock {
            requested: 3,
            available: 1,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
