// HTTP handlers for product unit endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::catalog::{CatalogError, CreateProductUnit, ProductUnit, UnitListResponse};
use crate::pricing::unit_catalog;

/// Handler for GET /api/products/{id}/units
/// Returns the purchasable units for a product with the resolved default
pub async fn list_units_handler(
    State(state): State<crate::AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<UnitListResponse>, CatalogError> {
    tracing::debug!("Listing units for product {}", product_id);

    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or(CatalogError::ProductNotFound(product_id))?;

    let stored = state.product_units.find_by_product(product_id).await?;

    // Single-unit products (or multi-unit products with nothing active) fall
    // back to the synthesized base unit priced at base_price.
    let units = match unit_catalog::resolve_units(&product, &stored) {
        Ok(units) => units,
        Err(_) => vec![unit_catalog::synthesize_base_unit(&product)],
    };

    let default_id = unit_catalog::default_unit(&units).id;
    let default_unit_id = if default_id == unit_catalog::SYNTHETIC_UNIT_ID {
        None
    } else {
        Some(default_id)
    };

    Ok(Json(UnitListResponse {
        product_id,
        units,
        default_unit_id,
    }))
}

/// Handler for POST /api/products/{id}/units
/// Creates a new purchasable unit for a product
pub async fn create_unit_handler(
    State(state): State<crate::AppState>,
    Path(product_id): Path<i32>,
    Json(request): Json<CreateProductUnit>,
) -> Result<(StatusCode, Json<ProductUnit>), CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or(CatalogError::ProductNotFound(product_id))?;

    let unit = state.product_units.insert(product_id, &request).await?;

    tracing::info!(
        "Created unit '{}' (pack_qty {}) for product {}",
        unit.unit,
        unit.pack_qty,
        product_id
    );
    Ok((StatusCode::CREATED, Json(unit)))
}
