// Result types produced by the pricing engine
//
// These are the in-process contracts consumed by the cart aggregate and the
// quote endpoints. Totals are authoritative; unit prices are display
// averages and must never be re-multiplied to recover a charged amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of pricing a quantity of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Per-pack price for display; the blended average when a fixed-price
    /// cap was exceeded
    pub unit_price: Decimal,
    /// Authoritative amount charged for the full quantity
    pub total_price: Decimal,
    /// Per-pack saving against the base price, zero when not promotional
    pub savings_per_unit: Decimal,
    pub is_promotional: bool,
    /// Qualification bounds copied from the matched promotion, when one
    /// matched (present even when the quantity fell below `min_qty`, so the
    /// caller can prompt the customer)
    pub min_qty: Option<i32>,
    pub max_qty: Option<i32>,
    /// Set only when the promotional price was actually applied
    pub promotion_id: Option<Uuid>,
}

impl PricingResult {
    /// Non-promotional pricing: every pack at the plain unit price
    pub fn base(unit_price: Decimal, quantity: i32) -> Self {
        Self {
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            savings_per_unit: Decimal::ZERO,
            is_promotional: false,
            min_qty: None,
            max_qty: None,
            promotion_id: None,
        }
    }
}

/// One customer pick inside an assorted bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboPick {
    pub unit_id: i32,
    pub qty: i32,
}

/// One constituent line of a priced bundle, for receipt/order display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboBreakdownEntry {
    pub product_id: i32,
    pub unit_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Result of resolving and pricing an assorted bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboResult {
    pub promotion_id: Uuid,
    /// Total price for one bundle, regardless of which items were picked
    pub bundle_price: Decimal,
    /// Even per-item split of the bundle price, rounded to cents
    pub price_per_item: Decimal,
    /// Per-constituent breakdown; line totals always sum to `bundle_price`
    pub breakdown: Vec<ComboBreakdownEntry>,
}

/// Full quote for a product/unit/quantity request: resolved unit, pricing,
/// and the stock headroom in packs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub product_id: i32,
    /// `None` when the product is priced through the synthesized base unit
    pub unit_id: Option<i32>,
    pub unit_name: String,
    pub pack_qty: i32,
    /// Pre-promotion per-pack price of the resolved unit
    pub base_price: Decimal,
    pub quantity: i32,
    pub pricing: PricingResult,
    /// How many packs of this unit the current stock can satisfy
    pub available_packs: i32,
}
