use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents a product in the storefront catalog
///
/// `base_price` is the price of the default/basic unit and `stock` is the
/// inventory expressed in base units. Products with `has_multi_units = false`
/// are priced through a synthesized single unit (pack_qty = 1) built by the
/// pricing engine; no `product_units` rows exist for them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Basmati Rice 1kg")]
    pub name: String,
    #[schema(example = "Long-grain aromatic rice")]
    pub description: String,
    #[schema(example = "https://cdn.example.com/rice.jpg")]
    pub image_url: String,
    /// Price of the default unit
    #[schema(value_type = f64, example = 4.50)]
    pub base_price: Decimal,
    /// Inventory in base units
    #[schema(example = 120)]
    pub stock: i32,
    #[schema(example = true)]
    pub has_multi_units: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the data needed to create a new product
///
/// Used for POST /api/products requests. All fields are required except id
/// and timestamps which are auto-generated.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    #[schema(example = "Basmati Rice 1kg")]
    pub name: String,
    #[schema(example = "Long-grain aromatic rice")]
    pub description: String,
    #[schema(example = "https://cdn.example.com/rice.jpg")]
    pub image_url: String,
    #[validate(custom = "crate::validation::validate_positive_price")]
    #[schema(value_type = f64, example = 4.50)]
    pub base_price: Decimal,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    #[schema(example = 120)]
    pub stock: i32,
    #[schema(example = false)]
    pub has_multi_units: bool,
}

/// Represents the data for updating an existing product
///
/// Used for PUT /api/products/{id} requests. All fields are optional to
/// support partial updates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[schema(example = "Updated Name")]
    pub name: Option<String>,
    #[schema(example = "Updated description")]
    pub description: Option<String>,
    #[schema(example = "https://cdn.example.com/updated.jpg")]
    pub image_url: Option<String>,
    #[validate(custom = "crate::validation::validate_optional_positive_price")]
    #[schema(value_type = f64, example = 5.00)]
    pub base_price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    #[schema(example = 80)]
    pub stock: Option<i32>,
    #[schema(example = true)]
    pub has_multi_units: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_serialization() {
        let product = Product {
            id: 1,
            name: "Basmati Rice 1kg".to_string(),
            description: "Long-grain aromatic rice".to_string(),
            image_url: "https://cdn.example.com/rice.jpg".to_string(),
            base_price: dec!(4.50),
            stock: 120,
            has_multi_units: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&product).expect("Failed to serialize Product");

        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"name\":\"Basmati Rice 1kg\""));
        assert!(json.contains("\"base_price\":\"4.50\""));
        assert!(json.contains("\"stock\":120"));
        assert!(json.contains("\"has_multi_units\":true"));
    }

    #[test]
    fn test_create_product_deserialization() {
        let json = r#"{
            "name": "Espresso Beans 500g",
            "description": "Dark roast",
            "image_url": "https://cdn.example.com/beans.jpg",
            "base_price": "12.90",
            "stock": 40,
            "has_multi_units": false
        }"#;

        let create: CreateProduct =
            serde_json::from_str(json).expect("Failed to deserialize CreateProduct");

        assert_eq!(create.name, "Espresso Beans 500g");
        assert_eq!(create.base_price, dec!(12.90));
        assert_eq!(create.stock, 40);
        assert!(!create.has_multi_units);
    }

    #[test]
    fn test_update_product_partial_fields() {
        let json = r#"{
            "name": "Partial Update",
            "stock": 10
        }"#;

        let update: UpdateProduct =
            serde_json::from_str(json).expect("Failed to deserialize UpdateProduct");

        assert_eq!(update.name, Some("Partial Update".to_string()));
        assert_eq!(update.stock, Some(10));
        assert_eq!(update.base_price, None);
        assert_eq!(update.has_multi_units, None);
    }

    #[test]
    fn test_create_product_validation() {
        let valid = CreateProduct {
            name: "Green Tea".to_string(),
            description: String::new(),
            image_url: String::new(),
            base_price: dec!(2.00),
            stock: 5,
            has_multi_units: false,
        };
        assert!(valid.validate().is_ok());

        let bad_price = CreateProduct {
            base_price: dec!(0),
            ..valid.clone()
        };
        assert!(bad_price.validate().is_err());

        let bad_stock = CreateProduct { stock: -1, ..valid };
        assert!(bad_stock.validate().is_err());
    }
}
