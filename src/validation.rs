// Validation utilities module
// Provides custom validation functions for domain-specific rules

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a price is strictly positive (for required Decimal fields)
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates that an optional price is strictly positive (for Option<Decimal> fields)
pub fn validate_optional_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    validate_positive_price(price)
}
