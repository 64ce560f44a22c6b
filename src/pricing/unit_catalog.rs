// Unit catalog resolution
//
// Normalizes a product's purchasable pack variants into a uniform list. A
// single-unit product is represented by one synthesized unit with
// pack_qty = 1 priced at the product's base price; the synthesized unit is
// never persisted.

use crate::catalog::ProductUnit;
use crate::models::Product;
use crate::pricing::error::PricingError;

/// Reserved unit id for the synthesized base unit of single-unit products
pub const SYNTHETIC_UNIT_ID: i32 = 0;

/// Build the synthesized base unit for a product
pub fn synthesize_base_unit(product: &Product) -> ProductUnit {
    ProductUnit {
        id: SYNTHETIC_UNIT_ID,
        product_id: product.id,
        unit: "unit".to_string(),
        pack_qty: 1,
        price: product.base_price,
        is_default: true,
        is_active: true,
    }
}

/// Resolve the purchasable units for a product
///
/// Single-unit products always resolve to the one synthesized unit.
/// Multi-unit products resolve to their active units; `EmptyCatalog` is
/// returned when none are active, and the caller falls back to
/// [`synthesize_base_unit`].
pub fn resolve_units(
    product: &Product,
    stored: &[ProductUnit],
) -> Result<Vec<ProductUnit>, PricingError> {
    if !product.has_multi_units {
        return Ok(vec![synthesize_base_unit(product)]);
    }

    let active: Vec<ProductUnit> = stored.iter().filter(|u| u.is_active).cloned().collect();
    if active.is_empty() {
        return Err(PricingError::EmptyCatalog(product.id));
    }

    Ok(active)
}

/// Select the default unit from a resolved (non-empty) unit list
///
/// Priority: explicit default that is active, then any active unit, then the
/// first unit in the list. Total for any non-empty input.
pub fn default_unit(units: &[ProductUnit]) -> &ProductUnit {
    units
        .iter()
        .find(|u| u.is_default && u.is_active)
        .or_else(|| units.iter().find(|u| u.is_active))
        .unwrap_or(&units[0])
}
