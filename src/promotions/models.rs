use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::promotions::error::PromotionError;

/// Type discriminator for promotion rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    FixedPrice,
    BulkPurchase,
    AssortedItems,
}

impl std::fmt::Display for PromotionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionType::FixedPrice => write!(f, "fixed_price"),
            PromotionType::BulkPurchase => write!(f, "bulk_purchase"),
            PromotionType::AssortedItems => write!(f, "assorted_items"),
        }
    }
}

/// Raw promotion row as stored in the `promotions` table
///
/// The table is a single wide row per promotion; which columns are populated
/// depends on `promotion_type`. Rows are converted into the typed
/// [`Promotion`] union before they reach the pricing engine, so malformed
/// rows are rejected at the boundary instead of being half-interpreted at
/// each call site.
#[derive(Debug, Clone, FromRow)]
pub struct PromotionRow {
    pub id: Uuid,
    pub promotion_type: PromotionType,
    pub product_id: Option<i32>,
    pub unit_id: Option<i32>,
    pub value: Option<Decimal>,
    pub min_qty: Option<i32>,
    pub max_qty: Option<i32>,
    pub required_qty: Option<i32>,
    pub free_qty: Option<i32>,
    pub required_item_count: Option<i32>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One eligible product/unit in an assorted bundle pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ComboPoolItem {
    pub product_id: i32,
    pub unit_id: i32,
}

/// Promotion payload, one variant per promotion type
///
/// Exhaustively matched by the pricing calculator and the combo resolver; an
/// unhandled promotion type is a compile error, never a silent fall-through
/// to non-promotional pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionKind {
    /// Promotional price per pack, gated by a minimum quantity and optionally
    /// capped: quantities above `max_qty` are blended with the base price
    FixedPrice {
        value: Decimal,
        min_qty: i32,
        max_qty: Option<i32>,
    },
    /// Buy `required_qty` packs, receive `free_qty` additional packs free
    BulkPurchase { required_qty: i32, free_qty: i32 },
    /// Fixed bundle price for `required_item_count` picks from a pool
    AssortedItems {
        items: Vec<ComboPoolItem>,
        required_item_count: i32,
        value: Decimal,
    },
}

/// An active promotion, already validated into its typed variant
///
/// `unit_id = None` on a fixed-price or bulk promotion means the promotion
/// applies product-wide (any unit of `product_id`). Assorted bundles carry
/// their own pool and leave `product_id`/`unit_id` unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: Uuid,
    pub product_id: Option<i32>,
    pub unit_id: Option<i32>,
    #[serde(flatten)]
    pub kind: PromotionKind,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Build a typed promotion from a raw row and (for bundles) its pool
    pub fn from_row(row: PromotionRow, pool: Vec<ComboPoolItem>) -> Result<Self, PromotionError> {
        let malformed = |reason: &str| PromotionError::Malformed {
            id: row.id,
            reason: reason.to_string(),
        };

        let kind = match row.promotion_type {
            PromotionType::FixedPrice => {
                let value = row.value.ok_or_else(|| malformed("missing value"))?;
                if value < Decimal::ZERO {
                    return Err(malformed("negative value"));
                }
                PromotionKind::FixedPrice {
                    value,
                    // A missing minimum means the promotion applies from the
                    // first pack.
                    min_qty: row.min_qty.unwrap_or(1).max(1),
                    max_qty: row.max_qty,
                }
            }
            PromotionType::BulkPurchase => {
                let required_qty = row
                    .required_qty
                    .filter(|q| *q > 0)
                    .ok_or_else(|| malformed("missing or non-positive required_qty"))?;
                let free_qty = row
                    .free_qty
                    .filter(|q| *q > 0)
                    .ok_or_else(|| malformed("missing or non-positive free_qty"))?;
                PromotionKind::BulkPurchase {
                    required_qty,
                    free_qty,
                }
            }
            PromotionType::AssortedItems => {
                let value = row.value.ok_or_else(|| malformed("missing value"))?;
                let required_item_count = row
                    .required_item_count
                    .filter(|c| *c > 0)
                    .ok_or_else(|| malformed("missing or non-positive required_item_count"))?;
                if pool.is_empty() {
                    return Err(malformed("empty bundle pool"));
                }
                PromotionKind::AssortedItems {
                    items: pool,
                    required_item_count,
                    value,
                }
            }
        };

        Ok(Promotion {
            id: row.id,
            product_id: row.product_id,
            unit_id: row.unit_id,
            kind,
            is_active: row.is_active,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            created_at: row.created_at,
        })
    }
}
