//! Database operations for `combos`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ComboRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub sizes: Vec<String>,
    #[serde(rename = "products")]
    pub product_ids: Vec<i64>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement payload for create and update.
#[derive(Debug, Clone)]
pub struct ComboWrite {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub sizes: Vec<String>,
    pub product_ids: Vec<i64>,
    pub featured_image: Option<String>,
}

const COMBO_COLUMNS: &str = "id, title, description, price, offer_price, sizes, product_ids, \
     featured_image, created_at, updated_at";

/// Combos, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_combos(pool: &PgPool) -> Result<Vec<ComboRow>, DbError> {
    let rows = sqlx::query_as::<_, ComboRow>(&format!(
        "SELECT {COMBO_COLUMNS} FROM combos ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no combo has `id`.
pub async fn get_combo(pool: &PgPool, id: i64) -> Result<ComboRow, DbError> {
    sqlx::query_as::<_, ComboRow>(&format!("SELECT {COMBO_COLUMNS} FROM combos WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_combo(pool: &PgPool, combo: &ComboWrite) -> Result<ComboRow, DbError> {
    let row = sqlx::query_as::<_, ComboRow>(&format!(
        "INSERT INTO combos \
             (title, description, price, offer_price, sizes, product_ids, featured_image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {COMBO_COLUMNS}"
    ))
    .bind(&combo.title)
    .bind(&combo.description)
    .bind(combo.price)
    .bind(combo.offer_price)
    .bind(&combo.sizes)
    .bind(&combo.product_ids)
    .bind(&combo.featured_image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replaces every editable column of combo `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist.
pub async fn update_combo(pool: &PgPool, id: i64, combo: &ComboWrite) -> Result<ComboRow, DbError> {
    sqlx::query_as::<_, ComboRow>(&format!(
        "UPDATE combos SET \
             title          = $2, \
             description    = $3, \
             price          = $4, \
             offer_price    = $5, \
             sizes          = $6, \
             product_ids    = $7, \
             featured_image = $8, \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {COMBO_COLUMNS}"
    ))
    .bind(id)
    .bind(&combo.title)
    .bind(&combo.description)
    .bind(combo.price)
    .bind(combo.offer_price)
    .bind(&combo.sizes)
    .bind(&combo.product_ids)
    .bind(&combo.featured_image)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist.
pub async fn delete_combo(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM combos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
