// HTTP handlers for promotion display endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::pricing::PromotionIndex;
use crate::promotions::{Promotion, PromotionError};

/// Optional filters for the promotion list
#[derive(Debug, Deserialize)]
pub struct PromotionListQuery {
    /// Restrict to promotions relevant to one unit (badge rendering)
    pub unit_id: Option<i32>,
}

/// Handler for GET /api/products/{id}/promotions
/// Returns the currently live promotions for a product (for savings badges);
/// `?unit_id=` narrows to the ones relevant to a single unit
pub async fn list_promotions_handler(
    State(state): State<crate::AppState>,
    Path(product_id): Path<i32>,
    Query(query): Query<PromotionListQuery>,
) -> Result<Json<Vec<Promotion>>, PromotionError> {
    tracing::debug!(
        "Listing promotions for product {} (unit {:?})",
        product_id,
        query.unit_id
    );

    let promotions = state.promotions.find_for_product(product_id).await?;

    // Reuse the engine's liveness filter so the display surface and the
    // pricing path agree on what counts as active.
    let index = PromotionIndex::build(promotions, Utc::now());
    let live: Vec<Promotion> = match query.unit_id {
        Some(unit_id) => index
            .promotions_for_unit(product_id, unit_id)
            .into_iter()
            .cloned()
            .collect(),
        None => index.into_promotions(),
    };

    tracing::debug!("{} live promotions for product {}", live.len(), product_id);
    Ok(Json(live))
}
