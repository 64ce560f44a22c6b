use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cart::{
    AddComboRequest, AddItemRequest, Cart, CartError, CartLine, CartRepository, CartResponse,
    NewCartLine,
};
use crate::catalog::{ProductRepository, ProductUnitRepository};
use crate::pricing::{
    stock, ComboBreakdownEntry, ComboPick, PricingEngine, PricingError, Quote,
};
use crate::promotions::PromotionRepository;

/// Service for cart business logic
///
/// Every price on a cart line is produced by the pricing engine; no handler
/// or repository computes blended prices on its own. Quantity changes and
/// revalidation re-run the engine against fresh promotion data.
#[derive(Clone)]
pub struct CartService {
    carts: CartRepository,
    products: ProductRepository,
    product_units: ProductUnitRepository,
    promotions: PromotionRepository,
    engine: PricingEngine,
}

impl CartService {
    /// Create a new CartService
    pub fn new(
        carts: CartRepository,
        products: ProductRepository,
        product_units: ProductUnitRepository,
        promotions: PromotionRepository,
    ) -> Self {
        Self {
            carts,
            products,
            product_units,
            promotions,
            engine: PricingEngine::new(),
        }
    }

    /// Create an empty cart
    pub async fn create_cart(&self) -> Result<Cart, CartError> {
        let cart = self.carts.create_cart().await?;
        tracing::info!("Created cart {}", cart.id);
        Ok(cart)
    }

    /// Fetch a cart with its lines and total
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<CartResponse, CartError> {
        let cart = self
            .carts
            .find_cart(cart_id)
            .await?
            .ok_or(CartError::CartNotFound(cart_id))?;
        let lines = self.carts.find_lines(cart_id).await?;
        Ok(CartResponse::from_parts(cart, lines))
    }

    /// Add a product/unit choice to a cart
    ///
    /// Adding the same product/unit again merges into the existing line and
    /// re-prices the merged quantity, so quantity tiers (blending, bulk
    /// bundles) apply to the combined amount.
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        request: AddItemRequest,
    ) -> Result<CartLine, CartError> {
        self.carts
            .find_cart(cart_id)
            .await?
            .ok_or(CartError::CartNotFound(cart_id))?;

        // First quote normalizes the unit choice (synthetic base unit maps
        // to unit_id = None) so the merge lookup is stable.
        let quote = self
            .quote_unit(request.product_id, request.unit_id, request.quantity)
            .await?;

        let existing = self
            .carts
            .find_unit_line(cart_id, request.product_id, quote.unit_id)
            .await?;

        match existing {
            Some(line) => {
                let merged_quantity = line.quantity + request.quantity;
                let quote = self
                    .quote_unit(request.product_id, quote.unit_id, merged_quantity)
                    .await?;

                tracing::info!(
                    "Merged {} more packs into cart line {} (now {})",
                    request.quantity,
                    line.id,
                    merged_quantity
                );
                self.carts
                    .update_line_pricing(
                        line.id,
                        merged_quantity,
                        quote.pricing.unit_price,
                        quote.pricing.total_price,
                        quote.pricing.min_qty,
                        quote.pricing.max_qty,
                        quote.pricing.promotion_id,
                    )
                    .await
            }
            None => {
                let line = self
                    .carts
                    .insert_line(NewCartLine {
                        cart_id,
                        product_id: Some(request.product_id),
                        unit_id: quote.unit_id,
                        quantity: quote.quantity,
                        unit_price: quote.pricing.unit_price,
                        base_price: quote.base_price,
                        line_total: quote.pricing.total_price,
                        min_qty: quote.pricing.min_qty,
                        max_qty: quote.pricing.max_qty,
                        promotion_id: quote.pricing.promotion_id,
                        is_combo: false,
                        combo_breakdown: None,
                    })
                    .await?;

                tracing::info!(
                    "Added product {} ({} packs) to cart {}",
                    request.product_id,
                    request.quantity,
                    cart_id
                );
                Ok(line)
            }
        }
    }

    /// Add an assorted bundle to a cart as one indivisible line
    ///
    /// `quantity` on the resulting line is the bundle count; the per-bundle
    /// pick set is immutable once added.
    pub async fn add_combo(
        &self,
        cart_id: Uuid,
        request: AddComboRequest,
    ) -> Result<CartLine, CartError> {
        self.carts
            .find_cart(cart_id)
            .await?
            .ok_or(CartError::CartNotFound(cart_id))?;

        let promotion = self
            .promotions
            .find_by_id(request.promotion_id)
            .await?
            .ok_or(CartError::PromotionNotFound(request.promotion_id))?;

        let result = self
            .engine
            .quote_combo(
                vec![promotion],
                request.promotion_id,
                &request.picks,
                Utc::now(),
            )?
            .ok_or(CartError::PromotionNotFound(request.promotion_id))?;

        self.check_combo_stock(&result.breakdown, request.bundles)
            .await?;

        let line_total = result.bundle_price * Decimal::from(request.bundles);
        let line = self
            .carts
            .insert_line(NewCartLine {
                cart_id,
                product_id: None,
                unit_id: None,
                quantity: request.bundles,
                unit_price: result.bundle_price,
                base_price: result.bundle_price,
                line_total,
                min_qty: None,
                max_qty: None,
                promotion_id: Some(result.promotion_id),
                is_combo: true,
                combo_breakdown: Some(result.breakdown),
            })
            .await?;

        tracing::info!(
            "Added {} bundle(s) of promotion {} to cart {}",
            request.bundles,
            request.promotion_id,
            cart_id
        );
        Ok(line)
    }

    /// Change a line's quantity, re-running the engine
    ///
    /// Combo lines scale the bundle count only; the constituents inside one
    /// bundle are never partially un-picked.
    pub async fn update_quantity(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        let line = self.line_in_cart(cart_id, line_id).await?;
        self.reprice_line(line, quantity).await
    }

    /// Re-price a line at its current quantity against fresh promotion data
    pub async fn revalidate(&self, cart_id: Uuid, line_id: Uuid) -> Result<CartLine, CartError> {
        let line = self.line_in_cart(cart_id, line_id).await?;
        let quantity = line.quantity;
        self.reprice_line(line, quantity).await
    }

    /// Remove a line from a cart
    pub async fn remove_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<(), CartError> {
        let deleted = self.carts.delete_line(cart_id, line_id).await?;
        if !deleted {
            return Err(CartError::LineNotFound(line_id));
        }
        tracing::info!("Removed line {} from cart {}", line_id, cart_id);
        Ok(())
    }

    async fn reprice_line(&self, line: CartLine, quantity: i32) -> Result<CartLine, CartError> {
        if line.is_combo {
            // Confirm the bundle is still live and priced the same per
            // bundle, then scale the bundle count.
            let promotion_id = line
                .promotion_id
                .ok_or(CartError::LineNotFound(line.id))?;
            let promotion = self
                .promotions
                .find_by_id(promotion_id)
                .await?
                .ok_or(CartError::PromotionNotFound(promotion_id))?;

            let picks: Vec<ComboPick> = line
                .combo_breakdown
                .as_ref()
                .map(|b| {
                    b.iter()
                        .map(|e| ComboPick {
                            unit_id: e.unit_id,
                            qty: e.quantity,
                        })
                        .collect()
                })
                .unwrap_or_default();

            let result = self
                .engine
                .quote_combo(vec![promotion], promotion_id, &picks, Utc::now())?
                .ok_or(CartError::PromotionNotFound(promotion_id))?;

            self.check_combo_stock(&result.breakdown, quantity).await?;

            let line_total = result.bundle_price * Decimal::from(quantity);
            return self
                .carts
                .update_line_pricing(
                    line.id,
                    quantity,
                    result.bundle_price,
                    line_total,
                    None,
                    None,
                    Some(promotion_id),
                )
                .await;
        }

        let product_id = line.product_id.ok_or(CartError::LineNotFound(line.id))?;
        let quote = self.quote_unit(product_id, line.unit_id, quantity).await?;

        self.carts
            .update_line_pricing(
                line.id,
                quantity,
                quote.pricing.unit_price,
                quote.pricing.total_price,
                quote.pricing.min_qty,
                quote.pricing.max_qty,
                quote.pricing.promotion_id,
            )
            .await
    }

    /// Gate every bundle constituent against converted stock before a combo
    /// line is inserted or scaled
    async fn check_combo_stock(
        &self,
        breakdown: &[ComboBreakdownEntry],
        bundles: i32,
    ) -> Result<(), CartError> {
        for entry in breakdown {
            let product = self
                .products
                .find_by_id(entry.product_id)
                .await
                .map_err(|e| CartError::DatabaseError(e.to_string()))?
                .ok_or(CartError::ProductNotFound(entry.product_id))?;

            let units = self
                .product_units
                .find_by_product(entry.product_id)
                .await
                .map_err(|e| CartError::DatabaseError(e.to_string()))?;
            let unit = units
                .iter()
                .find(|u| u.id == entry.unit_id)
                .ok_or(CartError::Pricing(PricingError::UnknownUnit(entry.unit_id)))?;

            stock::check_bundle_availability(&product, unit, entry.quantity, bundles)?;
        }
        Ok(())
    }

    async fn line_in_cart(&self, cart_id: Uuid, line_id: Uuid) -> Result<CartLine, CartError> {
        let line = self
            .carts
            .find_line(line_id)
            .await?
            .ok_or(CartError::LineNotFound(line_id))?;
        if line.cart_id != cart_id {
            return Err(CartError::LineNotFound(line_id));
        }
        Ok(line)
    }

    async fn quote_unit(
        &self,
        product_id: i32,
        unit_id: Option<i32>,
        quantity: i32,
    ) -> Result<Quote, CartError> {
        let product = self
            .products
            .find_by_id(product_id)
            .await
            .map_err(|e| CartError::DatabaseError(e.to_string()))?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let units = self
            .product_units
            .find_by_product(product_id)
            .await
            .map_err(|e| CartError::DatabaseError(e.to_string()))?;

        let promotions = self.promotions.find_for_product(product_id).await?;

        let quote = self
            .engine
            .quote(&product, &units, promotions, unit_id, quantity, Utc::now())?;
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    // Cart flows need a live database and are covered by the handler
    // integration tests; the pricing decisions the service delegates to are
    // tested exhaustively in the pricing modules.
}
