pub mod calculator;
pub mod combo;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod promotion_index;
pub mod stock;
pub mod types;
pub mod unit_catalog;

pub use error::PricingError;
pub use handlers::*;
pub use promotion_index::PromotionIndex;
pub use types::{ComboBreakdownEntry, ComboPick, ComboResult, PricingResult, Quote};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::ProductUnit;
use crate::models::Product;
use crate::promotions::Promotion;

/// Façade over the pricing pipeline: resolve units, index promotions, match,
/// price, gate against stock
///
/// Pure and stateless; all inputs including the clock instant are passed in.
/// The cart service and the quote handlers go through this so every call
/// site applies the same rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Price `quantity` packs of a unit of `product`
    ///
    /// `unit_id = None` selects the resolved default unit; for a single-unit
    /// product that is always the synthesized base unit.
    pub fn quote(
        &self,
        product: &Product,
        stored_units: &[ProductUnit],
        promotions: Vec<Promotion>,
        unit_id: Option<i32>,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<Quote, PricingError> {
        let units = match unit_catalog::resolve_units(product, stored_units) {
            Ok(units) => units,
            Err(PricingError::EmptyCatalog(_)) => {
                vec![unit_catalog::synthesize_base_unit(product)]
            }
            Err(err) => return Err(err),
        };

        let unit = match unit_id {
            Some(id) => units
                .iter()
                .find(|u| u.id == id)
                .ok_or(PricingError::UnknownUnit(id))?,
            None => unit_catalog::default_unit(&units),
        };

        let index = PromotionIndex::build(promotions, now);
        let match_unit_id = if unit.id == unit_catalog::SYNTHETIC_UNIT_ID {
            None
        } else {
            Some(unit.id)
        };
        let promotion = matcher::match_promotion(&index, product.id, match_unit_id);

        let pricing = calculator::price(unit, promotion, quantity)?;
        let available_packs = stock::check_availability(product, unit, quantity)?;

        Ok(Quote {
            product_id: product.id,
            unit_id: match_unit_id,
            unit_name: unit.unit.clone(),
            pack_qty: unit.pack_qty,
            base_price: unit.price,
            quantity,
            pricing,
            available_packs,
        })
    }

    /// Price one assorted bundle against the live promotion set
    ///
    /// Returns `Ok(None)` when no live bundle carries `promotion_id`, which
    /// covers both unknown IDs and expired/disabled bundles.
    pub fn quote_combo(
        &self,
        promotions: Vec<Promotion>,
        promotion_id: Uuid,
        picks: &[ComboPick],
        now: DateTime<Utc>,
    ) -> Result<Option<ComboResult>, PricingError> {
        let index = PromotionIndex::build(promotions, now);
        let Some(promotion) = index.combo(promotion_id) else {
            return Ok(None);
        };

        combo::resolve(picks, promotion).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::promotions::{ComboPoolItem, PromotionKind};

    fn product() -> Product {
        Product {
            id: 1,
            name: "Eggs".to_string(),
            description: String::new(),
            image_url: String::new(),
            base_price: dec!(0.60),
            stock: 100,
            has_multi_units: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tray() -> ProductUnit {
        ProductUnit {
            id: 10,
            product_id: 1,
            unit: "tray".to_string(),
            pack_qty: 10,
            price: dec!(5.00),
            is_default: true,
            is_active: true,
        }
    }

    fn tray_promo() -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            product_id: Some(1),
            unit_id: Some(10),
            kind: PromotionKind::FixedPrice {
                value: dec!(4.00),
                min_qty: 1,
                max_qty: None,
            },
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_quote_runs_full_pipeline() {
        let engine = PricingEngine::new();
        let quote = engine
            .quote(&product(), &[tray()], vec![tray_promo()], Some(10), 3, Utc::now())
            .unwrap();

        assert_eq!(quote.unit_id, Some(10));
        assert_eq!(quote.pack_qty, 10);
        assert_eq!(quote.pricing.total_price, dec!(12.00));
        assert!(quote.pricing.is_promotional);
        // 100 base units in trays of 10
        assert_eq!(quote.available_packs, 10);
    }

    #[test]
    fn test_quote_gates_on_stock() {
        let engine = PricingEngine::new();
        let err = engine
            .quote(&product(), &[tray()], vec![], Some(10), 11, Utc::now())
            .unwrap_err();

        assert_eq!(
            err,
            PricingError::InsufficientStock {
                requested: 11,
                available: 10
            }
        );
    }

    #[test]
    fn test_quote_default_unit_when_unset() {
        let engine = PricingEngine::new();
        let quote = engine
            .quote(&product(), &[tray()], vec![], None, 1, Utc::now())
            .unwrap();
        assert_eq!(quote.unit_id, Some(10));
    }

    #[test]
    fn test_quote_single_unit_product_uses_synthetic_unit() {
        let mut product = product();
        product.has_multi_units = false;

        let engine = PricingEngine::new();
        let quote = engine.quote(&product, &[], vec![], None, 2, Utc::now()).unwrap();

        assert_eq!(quote.unit_id, None);
        assert_eq!(quote.pack_qty, 1);
        assert_eq!(quote.pricing.total_price, dec!(1.20));
    }

    #[test]
    fn test_quote_unknown_unit_rejected() {
        let engine = PricingEngine::new();
        let err = engine
            .quote(&product(), &[tray()], vec![], Some(99), 1, Utc::now())
            .unwrap_err();
        assert_eq!(err, PricingError::UnknownUnit(99));
    }

    #[test]
    fn test_combo_quote_unknown_bundle_is_none() {
        let engine = PricingEngine::new();
        let result = engine
            .quote_combo(vec![], Uuid::new_v4(), &[], Utc::now())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_combo_quote_resolves_live_bundle() {
        let bundle = Promotion {
            id: Uuid::new_v4(),
            product_id: None,
            unit_id: None,
            kind: PromotionKind::AssortedItems {
                items: vec![
                    ComboPoolItem {
                        product_id: 1,
                        unit_id: 10,
                    },
                    ComboPoolItem {
                        product_id: 2,
                        unit_id: 11,
                    },
                ],
                required_item_count: 4,
                value: dec!(20.00),
            },
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        };
        let id = bundle.id;

        let picks = vec![
            ComboPick {
                unit_id: 10,
                qty: 2,
            },
            ComboPick {
                unit_id: 11,
                qty: 2,
            },
        ];

        let engine = PricingEngine::new();
        let result = engine
            .quote_combo(vec![bundle], id, &picks, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(result.bundle_price, dec!(20.00));
        assert_eq!(result.price_per_item, dec!(5.00));
    }
}
