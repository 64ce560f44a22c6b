use sqlx::PgPool;
use uuid::Uuid;

use crate::promotions::error::PromotionError;
use crate::promotions::models::{ComboPoolItem, Promotion, PromotionRow, PromotionType};

/// Repository for promotion records
///
/// Returns promotions already converted into the typed [`Promotion`] union.
/// Rows that fail conversion are logged and skipped rather than failing the
/// whole fetch; one bad promotion must not take pricing down for a product.
#[derive(Clone)]
pub struct PromotionRepository {
    pool: PgPool,
}

impl PromotionRepository {
    /// Create a new PromotionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch promotions referencing a product, either directly (fixed price,
    /// bulk purchase) or through an assorted bundle pool
    pub async fn find_for_product(&self, product_id: i32) -> Result<Vec<Promotion>, PromotionError> {
        let rows = sqlx::query_as::<_, PromotionRow>(
            r#"
            SELECT DISTINCT p.id, p.promotion_type, p.product_id, p.unit_id, p.value,
                   p.min_qty, p.max_qty, p.required_qty, p.free_qty, p.required_item_count,
                   p.is_active, p.starts_at, p.ends_at, p.created_at
            FROM promotions p
            LEFT JOIN promotion_items pi ON pi.promotion_id = p.id
            WHERE p.product_id = $1 OR pi.product_id = $1
            ORDER BY p.created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Fetch a single promotion by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Promotion>, PromotionError> {
        let row = sqlx::query_as::<_, PromotionRow>(
            r#"
            SELECT id, promotion_type, product_id, unit_id, value,
                   min_qty, max_qty, required_qty, free_qty, required_item_count,
                   is_active, starts_at, ends_at, created_at
            FROM promotions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let pool = self.pool_for(row.id, row.promotion_type).await?;
        let promotion = Promotion::from_row(row, pool)?;
        Ok(Some(promotion))
    }

    /// Convert raw rows into typed promotions, loading bundle pools as needed
    async fn assemble(&self, rows: Vec<PromotionRow>) -> Result<Vec<Promotion>, PromotionError> {
        let mut promotions = Vec::with_capacity(rows.len());
        for row in rows {
            let pool = self.pool_for(row.id, row.promotion_type).await?;
            match Promotion::from_row(row, pool) {
                Ok(promotion) => promotions.push(promotion),
                Err(err) => {
                    tracing::warn!("Skipping unusable promotion: {}", err);
                }
            }
        }
        Ok(promotions)
    }

    async fn pool_for(
        &self,
        promotion_id: Uuid,
        promotion_type: PromotionType,
    ) -> Result<Vec<ComboPoolItem>, PromotionError> {
        if promotion_type != PromotionType::AssortedItems {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, ComboPoolItem>(
            r#"
            SELECT product_id, unit_id
            FROM promotion_items
            WHERE promotion_id = $1
            ORDER BY id
            "#,
        )
        .bind(promotion_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    // Row-to-union conversion is covered in promotions::models; queries are
    // exercised through handler integration tests against a live database.
}
