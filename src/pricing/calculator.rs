// Per-unit pricing
//
// Totals are computed tier by tier in exact decimal arithmetic; the display
// unit price is derived from the total afterwards, never the other way
// around. Re-multiplying a rounded average must not change what is charged.

use rust_decimal::Decimal;

use crate::catalog::ProductUnit;
use crate::pricing::error::PricingError;
use crate::pricing::types::PricingResult;
use crate::promotions::{Promotion, PromotionKind};

/// Price `quantity` packs of `unit` under an optional matched promotion
///
/// Assorted bundles never reach this path; handing one in is a caller bug
/// and is reported as `WrongPromotionKind` rather than silently priced at
/// the base rate.
pub fn price(
    unit: &ProductUnit,
    promotion: Option<&Promotion>,
    quantity: i32,
) -> Result<PricingResult, PricingError> {
    if quantity <= 0 {
        return Err(PricingError::InvalidQuantity(quantity));
    }

    let Some(promotion) = promotion else {
        return Ok(PricingResult::base(unit.price, quantity));
    };

    match &promotion.kind {
        PromotionKind::FixedPrice {
            value,
            min_qty,
            max_qty,
        } => Ok(price_fixed(
            unit, promotion, *value, *min_qty, *max_qty, quantity,
        )),
        PromotionKind::BulkPurchase {
            required_qty,
            free_qty,
        } => Ok(price_bulk(unit, promotion, *required_qty, *free_qty, quantity)),
        PromotionKind::AssortedItems { .. } => Err(PricingError::WrongPromotionKind(promotion.id)),
    }
}

fn price_fixed(
    unit: &ProductUnit,
    promotion: &Promotion,
    promo_price: Decimal,
    min_qty: i32,
    max_qty: Option<i32>,
    quantity: i32,
) -> PricingResult {
    if quantity < min_qty {
        // Below the qualification threshold: full price at the requested
        // quantity, with the thresholds surfaced so the caller can prompt
        // the customer to reach them.
        let mut result = PricingResult::base(unit.price, quantity);
        result.min_qty = Some(min_qty);
        result.max_qty = max_qty;
        return result;
    }

    let promo_qty = match max_qty {
        Some(cap) if quantity > cap => cap,
        _ => quantity,
    };
    let full_qty = quantity - promo_qty;

    let total_price =
        promo_price * Decimal::from(promo_qty) + unit.price * Decimal::from(full_qty);
    let unit_price = if full_qty == 0 {
        promo_price
    } else {
        (total_price / Decimal::from(quantity)).round_dp(2)
    };

    let savings = unit.price - promo_price;
    PricingResult {
        unit_price,
        total_price,
        savings_per_unit: savings.max(Decimal::ZERO),
        is_promotional: true,
        min_qty: Some(min_qty),
        max_qty,
        promotion_id: Some(promotion.id),
    }
}

fn price_bulk(
    unit: &ProductUnit,
    promotion: &Promotion,
    required_qty: i32,
    free_qty: i32,
    quantity: i32,
) -> PricingResult {
    let paid = paid_packs(quantity, required_qty, free_qty);
    if paid == quantity {
        // Not enough packs to earn a free one.
        return PricingResult::base(unit.price, quantity);
    }

    let total_price = unit.price * Decimal::from(paid);
    let unit_price = (total_price / Decimal::from(quantity)).round_dp(2);

    PricingResult {
        unit_price,
        total_price,
        savings_per_unit: (unit.price - unit_price).max(Decimal::ZERO),
        is_promotional: true,
        min_qty: None,
        max_qty: None,
        promotion_id: Some(promotion.id),
    }
}

/// Paid packs for a "buy `required_qty` get `free_qty` free" promotion
///
/// Full bundles of `required_qty + free_qty` cost `required_qty` each; a
/// partial trailing bundle is paid up to `required_qty` packs.
pub fn paid_packs(quantity: i32, required_qty: i32, free_qty: i32) -> i32 {
    let bundle = required_qty + free_qty;
    let full_bundles = quantity / bundle;
    let remainder = quantity % bundle;
    full_bundles * required_qty + remainder.min(required_qty)
}
