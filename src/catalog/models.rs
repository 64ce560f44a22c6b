use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A purchasable pack variant of a product (e.g. single piece, dozen, case)
///
/// `pack_qty` is the number of base units one pack of this variant contains;
/// it is the conversion factor between pack counts and raw `Product.stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductUnit {
    pub id: i32,
    pub product_id: i32,
    /// Display name/shortcode of the unit (e.g. "pcs", "dozen", "case-24")
    pub unit: String,
    pub pack_qty: i32,
    /// Price for one pack of this unit
    pub price: Decimal,
    pub is_default: bool,
    pub is_active: bool,
}

/// Request DTO for creating a product unit
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductUnit {
    #[validate(length(min = 1, message = "Unit name must not be empty"))]
    pub unit: String,
    #[validate(range(min = 1, message = "Pack quantity must be at least 1"))]
    pub pack_qty: i32,
    #[validate(custom = "crate::validation::validate_positive_price")]
    pub price: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

/// Response DTO for GET /api/products/{id}/units
///
/// `default_unit_id` is `None` when the product is priced through the
/// synthesized base unit (single-unit products).
#[derive(Debug, Serialize)]
pub struct UnitListResponse {
    pub product_id: i32,
    pub units: Vec<ProductUnit>,
    pub default_unit_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_unit_validation() {
        let valid = CreateProductUnit {
            unit: "dozen".to_string(),
            pack_qty: 12,
            price: dec!(48.00),
            is_default: false,
        };
        assert!(valid.validate().is_ok());

        let zero_pack = CreateProductUnit {
            pack_qty: 0,
            ..valid.clone()
        };
        assert!(zero_pack.validate().is_err());

        let free_pack = CreateProductUnit {
            price: dec!(0),
            ..valid
        };
        assert!(free_pack.validate().is_err());
    }

    #[test]
    fn test_unit_deserialization_defaults() {
        let json = r#"{"unit": "case-24", "pack_qty": 24, "price": "90.00"}"#;
        let unit: CreateProductUnit = serde_json::from_str(json).unwrap();
        assert!(!unit.is_default);
        assert_eq!(unit.pack_qty, 24);
    }
}
