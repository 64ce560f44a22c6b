use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pricing::{ComboBreakdownEntry, ComboPick};

/// A shopping cart
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One priced line in a cart
///
/// `base_price` is the pre-promotion per-pack price, retained so blended
/// totals can be recomputed when the quantity changes. `line_total` is the
/// authoritative charged amount; `unit_price` may be a blended display
/// average. Combo lines have `product_id = None` (a bundle spans products)
/// and carry their per-bundle constituents in `combo_breakdown`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Option<i32>,
    /// `None` for the synthesized base unit of a single-unit product
    pub unit_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub base_price: Decimal,
    pub line_total: Decimal,
    pub min_qty: Option<i32>,
    pub max_qty: Option<i32>,
    pub promotion_id: Option<Uuid>,
    pub is_combo: bool,
    pub combo_breakdown: Option<Json<Vec<ComboBreakdownEntry>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field bundle for inserting a line, filled in by the cart service
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub cart_id: Uuid,
    pub product_id: Option<i32>,
    pub unit_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub base_price: Decimal,
    pub line_total: Decimal,
    pub min_qty: Option<i32>,
    pub max_qty: Option<i32>,
    pub promotion_id: Option<Uuid>,
    pub is_combo: bool,
    pub combo_breakdown: Option<Vec<ComboBreakdownEntry>>,
}

/// Request body for POST /api/carts/{id}/items
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: i32,
    /// Omit to add the product's default unit
    pub unit_id: Option<i32>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request body for POST /api/carts/{id}/combos
///
/// `picks` describes one bundle; `bundles` is how many of it to add.
#[derive(Debug, Deserialize, Validate)]
pub struct AddComboRequest {
    pub promotion_id: Uuid,
    #[validate(length(min = 1, message = "At least one pick is required"))]
    pub picks: Vec<ComboPick>,
    #[validate(range(min = 1, message = "Bundle count must be at least 1"))]
    #[serde(default = "default_bundles")]
    pub bundles: i32,
}

fn default_bundles() -> i32 {
    1
}

/// Request body for PATCH /api/carts/{id}/items/{line_id}
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Full cart payload returned by the cart endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub lines: Vec<CartLine>,
    /// Sum of line totals, the amount the order backend will re-validate
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    pub fn from_parts(cart: Cart, lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(|l| l.line_total).sum();
        Self {
            id: cart.id,
            lines,
            total,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(line_total: Decimal) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            product_id: Some(1),
            unit_id: None,
            quantity: 1,
            unit_price: line_total,
            base_price: line_total,
            line_total,
            min_qty: None,
            max_qty: None,
            promotion_id: None,
            is_combo: false,
            combo_breakdown: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_total_sums_line_totals() {
        let cart = Cart {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response =
            CartResponse::from_parts(cart, vec![line(dec!(12.50)), line(dec!(7.49))]);
        assert_eq!(response.total, dec!(19.99));
    }

    #[test]
    fn test_add_item_request_validation() {
        let request = AddItemRequest {
            product_id: 1,
            unit_id: None,
            quantity: 0,
        };
        assert!(request.validate().is_err());

        let request = AddItemRequest {
            product_id: 1,
            unit_id: Some(10),
            quantity: 3,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_add_combo_request_defaults_to_one_bundle() {
        let json = r#"{"promotion_id":"6f2f1c1e-54c8-4c2e-9a2b-0c9a5a1d2e3f","picks":[{"unit_id":10,"qty":4}]}"#;
        let request: AddComboRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.bundles, 1);
        assert!(request.validate().is_ok());
    }
}
