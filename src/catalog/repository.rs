use sqlx::PgPool;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{CreateProductUnit, ProductUnit};
use crate::models::Product;

/// Repository for product lookups used by pricing and cart flows
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new ProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Product>, CatalogError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, image_url, base_price, stock, has_multi_units,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}

/// Repository for product unit operations
#[derive(Clone)]
pub struct ProductUnitRepository {
    pool: PgPool,
}

impl ProductUnitRepository {
    /// Create a new ProductUnitRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find all units for a product, defaults first
    pub async fn find_by_product(&self, product_id: i32) -> Result<Vec<ProductUnit>, CatalogError> {
        let units = sqlx::query_as::<_, ProductUnit>(
            r#"
            SELECT id, product_id, unit, pack_qty, price, is_default, is_active
            FROM product_units
            WHERE product_id = $1
            ORDER BY is_default DESC, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    /// Insert a new unit for a product
    ///
    /// When the new unit is flagged as default, any previous default is
    /// cleared in the same transaction (at most one default per product).
    pub async fn insert(
        &self,
        product_id: i32,
        request: &CreateProductUnit,
    ) -> Result<ProductUnit, CatalogError> {
        let mut tx = self.pool.begin().await?;

        let duplicate: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM product_units WHERE product_id = $1 AND unit = $2)",
        )
        .bind(product_id)
        .bind(&request.unit)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate.unwrap_or(false) {
            return Err(CatalogError::DuplicateUnit {
                product_id,
                unit: request.unit.clone(),
            });
        }

        if request.is_default {
            sqlx::query("UPDATE product_units SET is_default = FALSE WHERE product_id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }

        let unit = sqlx::query_as::<_, ProductUnit>(
            r#"
            INSERT INTO product_units (product_id, unit, pack_qty, price, is_default, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id, product_id, unit, pack_qty, price, is_default, is_active
            "#,
        )
        .bind(product_id)
        .bind(&request.unit)
        .bind(request.pack_qty)
        .bind(request.price)
        .bind(request.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(unit)
    }
}
