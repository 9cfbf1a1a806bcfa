//! Database operations for `products` and `product_variants`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kidshop_core::VariantFields;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::DbError;

const MAX_LIST_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "categories")]
    pub category_ids: Vec<i64>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub design_name: Option<String>,
    pub image: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `product_variants` table. Attribute columns are
/// `NOT NULL DEFAULT ''`, so an unset attribute reads as an empty string.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub design: String,
    pub color: String,
    pub size: String,
    pub sku: Option<String>,
    pub stock: i32,
    pub price: Option<Decimal>,
}

impl VariantFields for VariantRow {
    fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    fn design(&self) -> &str {
        &self.design
    }

    fn color(&self) -> &str {
        &self.color
    }

    fn size(&self) -> &str {
        &self.size
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: ProductRow,
    pub variants: Vec<VariantRow>,
}

/// Per-product stock view for the admin inventory screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_id: i64,
    pub product_name: String,
    pub variant_stocks: Vec<VariantStock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStock {
    pub variant_id: i64,
    pub design: String,
    pub color: String,
    pub size: String,
    pub sku: Option<String>,
    pub stock: i32,
}

// ---------------------------------------------------------------------------
// Write models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewVariant {
    pub design: String,
    pub color: String,
    pub size: String,
    pub sku: Option<String>,
    pub stock: i32,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_ids: Vec<i64>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub design_name: Option<String>,
    pub image: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub featured_only: bool,
    pub limit: Option<i64>,
}

impl ProductFilter {
    fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT)
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, category_ids, price, offer_price, \
     purchase_price, design_name, image, images, is_active, is_featured, created_at, updated_at";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Lists active products, newest first, each with its variants.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_products(
    pool: &PgPool,
    filter: &ProductFilter,
) -> Result<Vec<ProductWithVariants>, DbError> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let products = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE is_active \
           AND ($1::bigint IS NULL OR $1 = ANY(category_ids)) \
           AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2) \
           AND (NOT $3 OR is_featured) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $4"
    ))
    .bind(filter.category_id)
    .bind(search)
    .bind(filter.featured_only)
    .bind(filter.effective_limit())
    .fetch_all(pool)
    .await?;

    let mut conn = pool.acquire().await?;
    attach_variants(&mut conn, products).await
}

/// Fetches one product with its variants, active or not.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `id`, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<ProductWithVariants, DbError> {
    let mut conn = pool.acquire().await?;
    load_products_with_variants(&mut conn, &[id])
        .await?
        .remove(&id)
        .ok_or(DbError::NotFound)
}

/// Loads the given products and their variants, keyed by product id.
///
/// Ids with no matching product are simply absent from the map. Takes a
/// connection so it can run inside an order-placement transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn load_products_with_variants(
    conn: &mut PgConnection,
    ids: &[i64],
) -> Result<HashMap<i64, ProductWithVariants>, DbError> {
    let products = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(attach_variants(conn, products)
        .await?
        .into_iter()
        .map(|p| (p.product.id, p))
        .collect())
}

/// Every product with its per-variant stock, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_stock(pool: &PgPool) -> Result<Vec<StockRow>, DbError> {
    let products = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY lower(name), id"
    ))
    .fetch_all(pool)
    .await?;

    let mut conn = pool.acquire().await?;
    Ok(attach_variants(&mut conn, products)
        .await?
        .into_iter()
        .map(|p| StockRow {
            product_id: p.product.id,
            product_name: p.product.name,
            variant_stocks: p
                .variants
                .into_iter()
                .map(|v| VariantStock {
                    variant_id: v.id,
                    design: v.design,
                    color: v.color,
                    size: v.size,
                    sku: v.sku,
                    stock: v.stock,
                })
                .collect(),
        })
        .collect())
}

async fn attach_variants(
    conn: &mut PgConnection,
    products: Vec<ProductRow>,
) -> Result<Vec<ProductWithVariants>, DbError> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();

    let variants = sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, design, color, size, sku, stock, price \
         FROM product_variants \
         WHERE product_id = ANY($1) \
         ORDER BY product_id, id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_product: HashMap<i64, Vec<VariantRow>> = HashMap::new();
    for variant in variants {
        by_product.entry(variant.product_id).or_default().push(variant);
    }

    Ok(products
        .into_iter()
        .map(|product| {
            let variants = by_product.remove(&product.id).unwrap_or_default();
            ProductWithVariants { product, variants }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product and its variants in one transaction.
///
/// Returns the new product id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is persisted in
/// that case.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (name, description, category_ids, price, offer_price, purchase_price, \
              design_name, image, images, is_active, is_featured) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category_ids)
    .bind(product.price)
    .bind(product.offer_price)
    .bind(product.purchase_price)
    .bind(&product.design_name)
    .bind(&product.image)
    .bind(&product.images)
    .bind(product.is_active)
    .bind(product.is_featured)
    .fetch_one(&mut *tx)
    .await?;

    for variant in &product.variants {
        sqlx::query(
            "INSERT INTO product_variants \
                 (product_id, design, color, size, sku, stock, price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(&variant.design)
        .bind(&variant.color)
        .bind(&variant.size)
        .bind(&variant.sku)
        .bind(variant.stock)
        .bind(variant.price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}
