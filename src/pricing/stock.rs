// Stock conversion and availability gating
//
// Inventory is tracked in base units; requested quantities arrive in packs.
// Every availability decision goes through the pack conversion so a request
// for 3 cases is never compared against a raw base-unit stock figure.

use crate::catalog::ProductUnit;
use crate::models::Product;
use crate::pricing::error::PricingError;

/// How many packs of `unit` the product's current stock can satisfy
pub fn available_packs(product: &Product, unit: &ProductUnit) -> i32 {
    product.stock / unit.pack_qty.max(1)
}

/// Gate a requested pack count against converted stock
///
/// Returns the available pack count on success so callers can surface the
/// remaining headroom without recomputing it.
pub fn check_availability(
    product: &Product,
    unit: &ProductUnit,
    requested_packs: i32,
) -> Result<i32, PricingError> {
    if requested_packs <= 0 {
        return Err(PricingError::InvalidQuantity(requested_packs));
    }

    let available = available_packs(product, unit);
    if requested_packs > available {
        return Err(PricingError::InsufficientStock {
            requested: requested_packs,
            available,
        });
    }

    Ok(available)
}

/// Gate one bundle constituent across a number of bundles
///
/// A combo cart line holds `bundles` copies of one pick set, so each
/// constituent needs `per_bundle_packs * bundles` packs of its unit in stock.
pub fn check_bundle_availability(
    product: &Product,
    unit: &ProductUnit,
    per_bundle_packs: i32,
    bundles: i32,
) -> Result<i32, PricingError> {
    check_availability(product, unit, per_bundle_packs.saturating_mul(bundles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(stock: i32) -> Product {
        Product {
            id: 1,
            name: "Eggs".to_string(),
            description: String::new(),
            image_url: String::new(),
            base_price: dec!(0.50),
            stock,
            has_multi_units: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn unit(pack_qty: i32) -> ProductUnit {
        ProductUnit {
            id: 10,
            product_id: 1,
            unit: "tray".to_string(),
            pack_qty,
            price: dec!(5.00),
            is_default: true,
            is_active: true,
        }
    }

    #[test]
    fn test_pack_conversion_rounds_down() {
        // 10 base units in packs of 4 satisfy 2 packs, not 2.5.
        let product = product(10);
        let unit = unit(4);

        assert_eq!(available_packs(&product, &unit), 2);
        assert_eq!(
            check_availability(&product, &unit, 3).unwrap_err(),
            PricingError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(check_availability(&product, &unit, 2).unwrap(), 2);
    }

    #[test]
    fn test_single_unit_conversion_is_identity() {
        let product = product(7);
        let unit = unit(1);

        assert_eq!(available_packs(&product, &unit), 7);
        assert_eq!(check_availability(&product, &unit, 7).unwrap(), 7);
    }

    #[test]
    fn test_zero_stock_rejects_any_request() {
        let product = product(0);
        let unit = unit(1);

        assert!(matches!(
            check_availability(&product, &unit, 1),
            Err(PricingError::InsufficientStock { available: 0, .. })
        ));
    }

    #[test]
    fn test_bundle_constituents_are_gated_across_bundles() {
        // 2 packs per bundle over 6 bundles needs 12 packs; only 10 in stock.
        let product = product(10);
        let unit = unit(1);

        assert_eq!(
            check_bundle_availability(&product, &unit, 2, 6).unwrap_err(),
            PricingError::InsufficientStock {
                requested: 12,
                available: 10
            }
        );
        assert_eq!(check_bundle_availability(&product, &unit, 2, 5).unwrap(), 10);
    }

    #[test]
    fn test_bundle_gating_converts_packs() {
        // 1 tray of 4 per bundle, 3 bundles: 12 base units against 10.
        let product = product(10);
        let unit = unit(4);

        assert_eq!(
            check_bundle_availability(&product, &unit, 1, 3).unwrap_err(),
            PricingError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_non_positive_request_is_invalid() {
        let product = product(10);
        let unit = unit(1);

        assert_eq!(
            check_availability(&product, &unit, 0).unwrap_err(),
            PricingError::InvalidQuantity(0)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pack_size_one_is_a_no_op(stock in 0..1_000_000i32) {
                let product = product(stock);
                let unit = unit(1);
                prop_assert_eq!(available_packs(&product, &unit), stock);
            }

            #[test]
            fn accepted_requests_never_exceed_stock(
                stock in 0..100_000i32,
                pack_qty in 1..100i32,
                requested in 1..2_000i32,
            ) {
                let product = product(stock);
                let unit = unit(pack_qty);

                if check_availability(&product, &unit, requested).is_ok() {
                    prop_assert!(requested * pack_qty <= stock);
                }
            }
        }
    }
}
