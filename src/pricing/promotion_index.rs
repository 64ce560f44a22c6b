// Liveness filtering and lookup for promotions
//
// The index is built once per pricing pass from the repository's result set,
// with the wall-clock instant passed in by the caller. Everything behind it
// only ever sees live promotions; an expired or disabled promotion is simply
// absent, never an error.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::promotions::{Promotion, PromotionKind};

/// Snapshot of the promotions that are live at one instant
#[derive(Debug, Clone, Default)]
pub struct PromotionIndex {
    promotions: Vec<Promotion>,
}

impl PromotionIndex {
    /// Build an index from repository rows, dropping anything not live at
    /// `now`: disabled promotions, not-yet-started windows, ended windows
    pub fn build(promotions: Vec<Promotion>, now: DateTime<Utc>) -> Self {
        let promotions = promotions
            .into_iter()
            .filter(|p| Self::is_live(p, now))
            .collect();
        Self { promotions }
    }

    fn is_live(promotion: &Promotion, now: DateTime<Utc>) -> bool {
        if !promotion.is_active {
            return false;
        }
        if let Some(starts_at) = promotion.starts_at {
            if now < starts_at {
                return false;
            }
        }
        if let Some(ends_at) = promotion.ends_at {
            if now > ends_at {
                return false;
            }
        }
        true
    }

    /// Per-unit promotions (fixed price, bulk purchase) targeting a product,
    /// including product-wide ones with no unit pin
    pub fn unit_promotions(&self, product_id: i32) -> impl Iterator<Item = &Promotion> {
        self.promotions.iter().filter(move |p| {
            p.product_id == Some(product_id)
                && !matches!(p.kind, PromotionKind::AssortedItems { .. })
        })
    }

    /// Look up a live assorted bundle by promotion ID
    pub fn combo(&self, id: Uuid) -> Option<&Promotion> {
        self.promotions
            .iter()
            .find(|p| p.id == id && matches!(p.kind, PromotionKind::AssortedItems { .. }))
    }

    /// Live assorted bundles whose pool contains the given product/unit, for
    /// "eligible for bundle" display badges
    pub fn combos_for_unit(&self, product_id: i32, unit_id: i32) -> Vec<&Promotion> {
        self.promotions
            .iter()
            .filter(|p| match &p.kind {
                PromotionKind::AssortedItems { items, .. } => items
                    .iter()
                    .any(|i| i.product_id == product_id && i.unit_id == unit_id),
                _ => false,
            })
            .collect()
    }

    /// Live promotions relevant to one unit: product-wide and unit-pinned
    /// fixed/bulk promotions plus bundles whose pool contains the unit
    pub fn promotions_for_unit(&self, product_id: i32, unit_id: i32) -> Vec<&Promotion> {
        let mut relevant: Vec<&Promotion> = self
            .unit_promotions(product_id)
            .filter(|p| p.unit_id.is_none() || p.unit_id == Some(unit_id))
            .collect();
        relevant.extend(self.combos_for_unit(product_id, unit_id));
        relevant
    }

    /// Consume the index and return the surviving promotions
    pub fn into_promotions(self) -> Vec<Promotion> {
        self.promotions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use crate::promotions::ComboPoolItem;

    fn fixed_price(product_id: i32, unit_id: Option<i32>) -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            product_id: Some(product_id),
            unit_id,
            kind: PromotionKind::FixedPrice {
                value: dec!(7.00),
                min_qty: 1,
                max_qty: None,
            },
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        }
    }

    fn combo(pool: Vec<ComboPoolItem>) -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            product_id: None,
            unit_id: None,
            kind: PromotionKind::AssortedItems {
                items: pool,
                required_item_count: 4,
                value: dec!(20.00),
            },
            is_active: true,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_inactive_promotions_are_dropped() {
        let mut promotion = fixed_price(1, None);
        promotion.is_active = false;

        let index = PromotionIndex::build(vec![promotion], Utc::now());
        assert_eq!(index.unit_promotions(1).count(), 0);
    }

    #[test]
    fn test_schedule_window_is_honored() {
        let now = Utc::now();

        let mut upcoming = fixed_price(1, None);
        upcoming.starts_at = Some(now + Duration::hours(1));

        let mut ended = fixed_price(1, None);
        ended.ends_at = Some(now - Duration::hours(1));

        let mut live = fixed_price(1, None);
        live.starts_at = Some(now - Duration::hours(1));
        live.ends_at = Some(now + Duration::hours(1));
        let live_id = live.id;

        let index = PromotionIndex::build(vec![upcoming, ended, live], now);
        let ids: Vec<Uuid> = index.unit_promotions(1).map(|p| p.id).collect();
        assert_eq!(ids, vec![live_id]);
    }

    #[test]
    fn test_unit_promotions_exclude_bundles() {
        let pool = vec![ComboPoolItem {
            product_id: 1,
            unit_id: 10,
        }];
        let index = PromotionIndex::build(vec![fixed_price(1, Some(10)), combo(pool)], Utc::now());

        assert_eq!(index.unit_promotions(1).count(), 1);
        assert_eq!(index.combos_for_unit(1, 10).len(), 1);
        assert!(index.combos_for_unit(1, 99).is_empty());
    }

    #[test]
    fn test_unit_badge_lookup_combines_pins_and_bundles() {
        let product_wide = fixed_price(1, None);
        let wide_id = product_wide.id;
        let pinned_elsewhere = fixed_price(1, Some(99));

        let bundle = combo(vec![ComboPoolItem {
            product_id: 1,
            unit_id: 10,
        }]);
        let bundle_id = bundle.id;

        let index = PromotionIndex::build(
            vec![product_wide, pinned_elsewhere, bundle],
            Utc::now(),
        );

        let ids: Vec<Uuid> = index
            .promotions_for_unit(1, 10)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![wide_id, bundle_id]);
    }

    #[test]
    fn test_combo_lookup_ignores_per_unit_promotions() {
        let promotion = fixed_price(1, None);
        let id = promotion.id;
        let index = PromotionIndex::build(vec![promotion], Utc::now());

        assert!(index.combo(id).is_none());
    }
}
