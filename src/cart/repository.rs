use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cart::error::CartError;
use crate::cart::models::{Cart, CartLine, NewCartLine};

/// Repository for carts and cart lines
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new CartRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart
    pub async fn create_cart(&self) -> Result<Cart, CartError> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id)
            VALUES (gen_random_uuid())
            RETURNING id, created_at, updated_at
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Fetch a cart by ID
    pub async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>, CartError> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, created_at, updated_at FROM carts WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Fetch all lines of a cart in insertion order
    pub async fn find_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, CartError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                   line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown,
                   created_at, updated_at
            FROM cart_lines
            WHERE cart_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Fetch a single line by ID
    pub async fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, CartError> {
        let line = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                   line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown,
                   created_at, updated_at
            FROM cart_lines
            WHERE id = $1
            "#,
        )
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Find the existing non-combo line for a product/unit pair, the merge
    /// target when the same choice is added again
    pub async fn find_unit_line(
        &self,
        cart_id: Uuid,
        product_id: i32,
        unit_id: Option<i32>,
    ) -> Result<Option<CartLine>, CartError> {
        let line = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                   line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown,
                   created_at, updated_at
            FROM cart_lines
            WHERE cart_id = $1
              AND product_id = $2
              AND unit_id IS NOT DISTINCT FROM $3
              AND is_combo = FALSE
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Insert a new line and bump the cart's updated_at
    pub async fn insert_line(&self, new_line: NewCartLine) -> Result<CartLine, CartError> {
        let mut tx = self.pool.begin().await?;

        let line = sqlx::query_as::<_, CartLine>(
            r#"
            INSERT INTO cart_lines
                (id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                 line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                      line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown,
                      created_at, updated_at
            "#,
        )
        .bind(new_line.cart_id)
        .bind(new_line.product_id)
        .bind(new_line.unit_id)
        .bind(new_line.quantity)
        .bind(new_line.unit_price)
        .bind(new_line.base_price)
        .bind(new_line.line_total)
        .bind(new_line.min_qty)
        .bind(new_line.max_qty)
        .bind(new_line.promotion_id)
        .bind(new_line.is_combo)
        .bind(new_line.combo_breakdown.map(Json))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(new_line.cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(line)
    }

    /// Update a line's quantity and pricing fields after re-running the
    /// engine, bumping the cart's updated_at
    #[allow(clippy::too_many_arguments)]
    pub async fn update_line_pricing(
        &self,
        line_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        line_total: Decimal,
        min_qty: Option<i32>,
        max_qty: Option<i32>,
        promotion_id: Option<Uuid>,
    ) -> Result<CartLine, CartError> {
        let mut tx = self.pool.begin().await?;

        let line = sqlx::query_as::<_, CartLine>(
            r#"
            UPDATE cart_lines
            SET quantity = $2, unit_price = $3, line_total = $4,
                min_qty = $5, max_qty = $6, promotion_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, cart_id, product_id, unit_id, quantity, unit_price, base_price,
                      line_total, min_qty, max_qty, promotion_id, is_combo, combo_breakdown,
                      created_at, updated_at
            "#,
        )
        .bind(line_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(line_total)
        .bind(min_qty)
        .bind(max_qty)
        .bind(promotion_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(line.cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(line)
    }

    /// Delete a line; returns false if it did not exist in this cart
    pub async fn delete_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<bool, CartError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND cart_id = $2")
            .bind(line_id)
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
                .bind(cart_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(result.rows_affected() > 0)
    }
}
