//! Database operations for `categories`.

use chrono::{DateTime, Utc};
use kidshop_core::{ensure_parent_allowed, slug_from_name, Category};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            image: row.image,
            parent_id: row.parent_id,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    /// Generated from `name` when absent or blank.
    pub slug: Option<String>,
    pub description: String,
    pub image: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Sparse update; `None` keeps the stored value. `parent_id: Some(None)`
/// detaches the category to the root.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, image, parent_id, is_active, sort_order, created_at, updated_at";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// All categories in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active categories in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no category has `id`.
pub async fn get_category(pool: &PgPool, id: i64) -> Result<CategoryRow, DbError> {
    sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Inserts a category, deriving the slug from the name when none is given.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on failure; a duplicate slug surfaces as a
/// unique violation (see [`DbError::is_unique_violation`]).
pub async fn create_category(pool: &PgPool, category: &NewCategory) -> Result<CategoryRow, DbError> {
    let slug = non_blank(category.slug.as_deref())
        .map_or_else(|| slug_from_name(&category.name), ToOwned::to_owned);

    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "INSERT INTO categories \
             (name, slug, description, image, parent_id, is_active, sort_order) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(category.name.trim())
    .bind(slug)
    .bind(&category.description)
    .bind(&category.image)
    .bind(category.parent_id)
    .bind(category.is_active)
    .bind(category.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Applies `update` to category `id`.
///
/// A changed name with no explicit slug regenerates the slug. A new parent
/// is checked against the stored hierarchy first.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist,
/// [`DbError::Core`] with `CycleDetected` if the new parent would close a
/// loop, or [`DbError::Sqlx`] on failure (including duplicate slugs).
pub async fn update_category(
    pool: &PgPool,
    id: i64,
    update: &UpdateCategory,
) -> Result<CategoryRow, DbError> {
    let mut tx = pool.begin().await?;

    let all: Vec<Category> = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id FOR UPDATE"
    ))
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(Category::from)
    .collect();

    let current = all.iter().find(|c| c.id == id).ok_or(DbError::NotFound)?;

    let name = non_blank(update.name.as_deref()).map_or_else(|| current.name.clone(), ToOwned::to_owned);
    let slug = match non_blank(update.slug.as_deref()) {
        Some(slug) => slug.to_string(),
        None if name != current.name => slug_from_name(&name),
        None => current.slug.clone(),
    };
    let parent_id = update.parent_id.unwrap_or(current.parent_id);
    if let Some(parent_id) = parent_id {
        ensure_parent_allowed(&all, id, parent_id)?;
    }

    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "UPDATE categories SET \
             name        = $2, \
             slug        = $3, \
             description = $4, \
             image       = $5, \
             parent_id   = $6, \
             is_active   = $7, \
             sort_order  = $8, \
             updated_at  = NOW() \
         WHERE id = $1 \
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .bind(&name)
    .bind(&slug)
    .bind(update.description.as_ref().unwrap_or(&current.description))
    .bind(update.image.as_ref().unwrap_or(&current.image))
    .bind(parent_id)
    .bind(update.is_active.unwrap_or(current.is_active))
    .bind(update.sort_order.unwrap_or(current.sort_order))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Deletes a category. Children keep their now-dangling `parent_id` and are
/// presented as roots.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist.
pub async fn delete_category(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
