// Assorted bundle resolution
//
// The bundle price depends only on how many picks are made, never which
// ones. The per-item split is an even division rounded to cents; the
// rounding residual is folded into the last breakdown line so the breakdown
// always sums to the bundle price exactly.

use rust_decimal::Decimal;

use crate::pricing::error::PricingError;
use crate::pricing::types::{ComboBreakdownEntry, ComboPick, ComboResult};
use crate::promotions::{Promotion, PromotionKind};

/// Validate and price one assorted bundle from the customer's picks
pub fn resolve(picks: &[ComboPick], promotion: &Promotion) -> Result<ComboResult, PricingError> {
    let PromotionKind::AssortedItems {
        items,
        required_item_count,
        value,
    } = &promotion.kind
    else {
        return Err(PricingError::WrongPromotionKind(promotion.id));
    };

    for pick in picks {
        if pick.qty <= 0 {
            return Err(PricingError::InvalidQuantity(pick.qty));
        }
    }

    let picked: i32 = picks.iter().map(|p| p.qty).sum();
    if picked != *required_item_count {
        return Err(PricingError::ComboIncomplete {
            required: *required_item_count,
            picked,
        });
    }

    let price_per_item = (*value / Decimal::from(*required_item_count)).round_dp(2);

    let mut breakdown = Vec::with_capacity(picks.len());
    for pick in picks {
        let pool_item = items
            .iter()
            .find(|i| i.unit_id == pick.unit_id)
            .ok_or(PricingError::InvalidComboItem(pick.unit_id))?;

        let line_total = price_per_item * Decimal::from(pick.qty);
        breakdown.push(ComboBreakdownEntry {
            product_id: pool_item.product_id,
            unit_id: pick.unit_id,
            quantity: pick.qty,
            unit_price: price_per_item,
            line_total,
        });
    }

    // Fold the even-split rounding residual into the last line so the
    // breakdown reconciles with the charged bundle price to the cent.
    let lines_total: Decimal = breakdown.iter().map(|e| e.line_total).sum();
    let residual = *value - lines_total;
    if !residual.is_zero() {
        if let Some(last) = breakdown.last_mut() {
            last.line_total += residual;
        }
    }

    Ok(ComboResult {
        promotion_id: promotion.id,
        bundle_price: *value,
        price_per_item,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::promotions::ComboPoolItem;

    fn bundle(required_item_count: i32, value: Decimal) -> Promotion {
        Promotion {
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
                    ComboPoolItem {
                        product_id: 3,
                        unit_id: 12,
                    },
                ],
                required_item_count,
                value,
            },
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_even_split_across_picks() {
        // 4 picks for 20.00: 5.00 per item, 2+2 split gives 10.00 lines.
        let promo = bundle(4, dec!(20.00));
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

        let result = resolve(&picks, &promo).unwrap();
        assert_eq!(result.bundle_price, dec!(20.00));
        assert_eq!(result.price_per_item, dec!(5.00));
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.breakdown[0].line_total, dec!(10.00));
        assert_eq!(result.breakdown[1].line_total, dec!(10.00));
        assert_eq!(result.breakdown[0].product_id, 1);
        assert_eq!(result.breakdown[1].product_id, 2);
    }

    #[test]
    fn test_under_picked_is_rejected() {
        let promo = bundle(4, dec!(20.00));
        let picks = vec![ComboPick {
            unit_id: 10,
            qty: 3,
        }];

        assert_eq!(
            resolve(&picks, &promo).unwrap_err(),
            PricingError::ComboIncomplete {
                required: 4,
                picked: 3
            }
        );
    }

    #[test]
    fn test_over_picked_is_rejected_not_truncated() {
        let promo = bundle(4, dec!(20.00));
        let picks = vec![
            ComboPick {
                unit_id: 10,
                qty: 3,
            },
            ComboPick {
                unit_id: 11,
                qty: 2,
            },
        ];

        assert_eq!(
            resolve(&picks, &promo).unwrap_err(),
            PricingError::ComboIncomplete {
                required: 4,
                picked: 5
            }
        );
    }

    #[test]
    fn test_pick_outside_pool_is_rejected() {
        let promo = bundle(2, dec!(20.00));
        let picks = vec![
            ComboPick {
                unit_id: 10,
                qty: 1,
            },
            ComboPick {
                unit_id: 99,
                qty: 1,
            },
        ];

        assert_eq!(
            resolve(&picks, &promo).unwrap_err(),
            PricingError::InvalidComboItem(99)
        );
    }

    #[test]
    fn test_non_positive_pick_quantity_is_rejected() {
        let promo = bundle(2, dec!(20.00));
        let picks = vec![
            ComboPick {
                unit_id: 10,
                qty: 2,
            },
            ComboPick {
                unit_id: 11,
                qty: 0,
            },
        ];

        assert_eq!(
            resolve(&picks, &promo).unwrap_err(),
            PricingError::InvalidQuantity(0)
        );
    }

    #[test]
    fn test_rounding_residual_lands_on_last_line() {
        // 10.00 over 3 picks: 3.33 per item, lines 3.33 + 6.66 leave a cent.
        let promo = bundle(3, dec!(10.00));
        let picks = vec![
            ComboPick {
                unit_id: 10,
                qty: 1,
            },
            ComboPick {
                unit_id: 11,
                qty: 2,
            },
        ];

        let result = resolve(&picks, &promo).unwrap();
        assert_eq!(result.price_per_item, dec!(3.33));
        assert_eq!(result.breakdown[0].line_total, dec!(3.33));
        assert_eq!(result.breakdown[1].line_total, dec!(6.67));

        let sum: Decimal = result.breakdown.iter().map(|e| e.line_total).sum();
        assert_eq!(sum, result.bundle_price);
    }

    #[test]
    fn test_per_unit_promotion_is_rejected() {
        let promo = Promotion {
            kind: PromotionKind::FixedPrice {
                value: dec!(7.00),
                min_qty: 1,
                max_qty: None,
            },
            ..bundle(4, dec!(20.00))
        };
        let picks = vec![ComboPick {
            unit_id: 10,
            qty: 4,
        }];

        assert_eq!(
            resolve(&picks, &promo).unwrap_err(),
            PricingError::WrongPromotionKind(promo.id)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn breakdown_always_sums_to_bundle_price(
                count in 1..20i32,
                cents in 1..1_000_000i64,
                first_share in 0..20i32,
            ) {
                let value = Decimal::new(cents, 2);
                let promo = bundle(count, value);

                let first = first_share.min(count);
                let mut picks = Vec::new();
                if first > 0 {
                    picks.push(ComboPick { unit_id: 10, qty: first });
                }
                if count - first > 0 {
                    picks.push(ComboPick { unit_id: 11, qty: count - first });
                }

                let result = resolve(&picks, &promo).unwrap();
                let sum: Decimal = result.breakdown.iter().map(|e| e.line_total).sum();
                prop_assert_eq!(sum, value);
            }
        }
    }
}
