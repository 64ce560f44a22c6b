mod cart;
mod catalog;
mod db;
mod error;
mod models;
mod pricing;
mod promotions;
mod validation;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cart::CartService;
use catalog::{ProductRepository, ProductUnitRepository};
use error::ApiError;
use models::{CreateProduct, Product, UpdateProduct};
use pricing::PricingEngine;
use promotions::PromotionRepository;
use validator::Validate;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        get_all_products,
        get_product_by_id,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct)
    ),
    tags(
        (name = "products", description = "Product catalog management endpoints")
    ),
    info(
        title = "Storefront Pricing API",
        version = "1.0.0",
        description = "RESTful API for product catalog, multi-unit pricing, and promotions",
        contact(
            name = "API Support",
            email = "support@storefrontapi.com"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub products: ProductRepository,
    pub product_units: ProductUnitRepository,
    pub promotions: PromotionRepository,
    pub pricing: PricingEngine,
    pub cart_service: CartService,
}

/// Handler for POST /api/products
/// Creates a new product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a positive number"})),
        (status = 409, description = "Duplicate product name", body = String, example = json!({"error": "Product with name 'Basmati Rice 1kg' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "products"
)]
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    tracing::debug!("Creating new product: {}", payload.name);

    // Validate the request using validator crate
    payload.validate()?;

    // Check for duplicate product name
    if db::check_duplicate_product(&state.db, &payload.name).await? {
        tracing::warn!("Attempt to create duplicate product: {}", payload.name);
        return Err(ApiError::Conflict {
            message: format!("Product with name '{}' already exists", payload.name),
        });
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, image_url, base_price, stock, has_multi_units)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, description, image_url, base_price, stock, has_multi_units,
                  created_at, updated_at
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.image_url)
    .bind(payload.base_price)
    .bind(payload.stock)
    .bind(payload.has_multi_units)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created product with id: {}", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for GET /api/products
/// Retrieves all products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of all products", body = Vec<Product>),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "products"
)]
async fn get_all_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    tracing::debug!("Fetching all products");

    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, image_url, base_price, stock, has_multi_units,
               created_at, updated_at
        FROM products
        ORDER BY id
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    tracing::debug!("Retrieved {} products", products.len());
    Ok(Json(products))
}

/// Handler for GET /api/products/:id
/// Retrieves a specific product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "products"
)]
async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Fetching product with id: {}", id);

    let product = state.products.find_by_id(id).await?.ok_or_else(|| {
        tracing::debug!("Product with id {} not found", id);
        ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        }
    })?;

    tracing::debug!("Successfully retrieved product: {}", product.name);
    Ok(Json(product))
}

/// Handler for PUT /api/products/:id
/// Updates an existing product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a positive number"})),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "products"
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Updating product with id: {}", id);

    payload.validate()?;

    // Transaction so the exists check, duplicate check, and update are atomic
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, image_url, base_price, stock, has_multi_units,
               created_at, updated_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Product with id {} not found for update", id);
        ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        }
    })?;

    // If name is being updated and differs, check for duplicates
    if let Some(ref new_name) = payload.name {
        if new_name != &existing.name {
            let duplicate_exists: Option<bool> = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND id != $2)",
            )
            .bind(new_name)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate_exists.unwrap_or(false) {
                tracing::warn!(
                    "Attempt to update product {} to duplicate name: {}",
                    id,
                    new_name
                );
                return Err(ApiError::Conflict {
                    message: format!("Product with name '{}' already exists", new_name),
                });
            }
        }
    }

    // Update with provided fields, keeping existing values for omitted fields
    let updated_product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $1,
            description = $2,
            image_url = $3,
            base_price = $4,
            stock = $5,
            has_multi_units = $6,
            updated_at = NOW()
        WHERE id = $7
        RETURNING id, name, description, image_url, base_price, stock, has_multi_units,
                  created_at, updated_at
        "#,
    )
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.description.unwrap_or(existing.description))
    .bind(payload.image_url.unwrap_or(existing.image_url))
    .bind(payload.base_price.unwrap_or(existing.base_price))
    .bind(payload.stock.unwrap_or(existing.stock))
    .bind(payload.has_multi_units.unwrap_or(existing.has_multi_units))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated product with id: {}", id);
    Ok(Json(updated_product))
}

/// Handler for DELETE /api/products/:id
/// Deletes a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 404, description = "Product not found", body = String, example = json!({"error": "Product with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "products"
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deleting product with id: {}", id);

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Product with id {} not found for deletion", id);
        return Err(ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted product with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let products = ProductRepository::new(db.clone());
    let product_units = ProductUnitRepository::new(db.clone());
    let promotions = PromotionRepository::new(db.clone());
    let cart_service = CartService::new(
        cart::CartRepository::new(db.clone()),
        products.clone(),
        product_units.clone(),
        promotions.clone(),
    );

    let state = AppState {
        db,
        products,
        product_units,
        promotions,
        pricing: PricingEngine::new(),
        cart_service,
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Product catalog
        .route("/api/products", post(create_product))
        .route("/api/products", get(get_all_products))
        .route("/api/products/:id", get(get_product_by_id))
        .route("/api/products/:id", put(update_product))
        .route("/api/products/:id", delete(delete_product))
        // Units and promotions per product
        .route("/api/products/:id/units", get(catalog::list_units_handler))
        .route("/api/products/:id/units", post(catalog::create_unit_handler))
        .route(
            "/api/products/:id/promotions",
            get(promotions::list_promotions_handler),
        )
        // Advisory quotes
        .route("/api/pricing/quote", post(pricing::quote_handler))
        .route("/api/pricing/combo-quote", post(pricing::combo_quote_handler))
        // Carts
        .route("/api/carts", post(cart::create_cart_handler))
        .route("/api/carts/:id", get(cart::get_cart_handler))
        .route("/api/carts/:id/items", post(cart::add_item_handler))
        .route("/api/carts/:id/combos", post(cart::add_combo_handler))
        .route(
            "/api/carts/:id/items/:line_id",
            patch(cart::update_line_handler),
        )
        .route(
            "/api/carts/:id/items/:line_id",
            delete(cart::remove_line_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Storefront API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Storefront API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
