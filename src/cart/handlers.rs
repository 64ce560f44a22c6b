// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::cart::{
    AddComboRequest, AddItemRequest, Cart, CartError, CartLine, CartResponse,
    UpdateQuantityRequest,
};

/// Handler for POST /api/carts
pub async fn create_cart_handler(
    State(state): State<crate::AppState>,
) -> Result<(StatusCode, Json<Cart>), CartError> {
    let cart = state.cart_service.create_cart().await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Handler for GET /api/carts/{id}
pub async fn get_cart_handler(
    State(state): State<crate::AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<CartResponse>, CartError> {
    tracing::debug!("Fetching cart {}", cart_id);
    let cart = state.cart_service.get_cart(cart_id).await?;
    Ok(Json(cart))
}

/// Handler for POST /api/carts/{id}/items
pub async fn add_item_handler(
    State(state): State<crate::AppState>,
    Path(cart_id): Path<Uuid>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartLine>), CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let line = state.cart_service.add_item(cart_id, request).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// Handler for POST /api/carts/{id}/combos
pub async fn add_combo_handler(
    State(state): State<crate::AppState>,
    Path(cart_id): Path<Uuid>,
    Json(request): Json<AddComboRequest>,
) -> Result<(StatusCode, Json<CartLine>), CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let line = state.cart_service.add_combo(cart_id, request).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// Handler for PATCH /api/carts/{id}/items/{line_id}
pub async fn update_line_handler(
    State(state): State<crate::AppState>,
    Path((cart_id, line_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartLine>, CartError> {
    request
        .validate()
        .map_err(|e| CartError::ValidationError(e.to_string()))?;

    let line = state
        .cart_service
        .update_quantity(cart_id, line_id, request.quantity)
        .await?;
    Ok(Json(line))
}

/// Handler for DELETE /api/carts/{id}/items/{line_id}
pub async fn remove_line_handler(
    State(state): State<crate::AppState>,
    Path((cart_id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, CartError> {
    state.cart_service.remove_line(cart_id, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
