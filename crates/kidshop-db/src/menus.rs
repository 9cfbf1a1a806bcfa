//! Database operations for `menus`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuRow {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub position: i32,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MenuWrite {
    pub name: String,
    pub link: String,
    pub position: i32,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

const MENU_COLUMNS: &str = "id, name, link, position, parent_id, is_active, created_at, updated_at";

/// Menu entries ordered by `position`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_menus(pool: &PgPool) -> Result<Vec<MenuRow>, DbError> {
    let rows = sqlx::query_as::<_, MenuRow>(&format!(
        "SELECT {MENU_COLUMNS} FROM menus ORDER BY position, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_menu(pool: &PgPool, menu: &MenuWrite) -> Result<MenuRow, DbError> {
    let row = sqlx::query_as::<_, MenuRow>(&format!(
        "INSERT INTO menus (name, link, position, parent_id, is_active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {MENU_COLUMNS}"
    ))
    .bind(&menu.name)
    .bind(&menu.link)
    .bind(menu.position)
    .bind(menu.parent_id)
    .bind(menu.is_active)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist.
pub async fn update_menu(pool: &PgPool, id: i64, menu: &MenuWrite) -> Result<MenuRow, DbError> {
    sqlx::query_as::<_, MenuRow>(&format!(
        "UPDATE menus SET \
             name       = $2, \
             link       = $3, \
             position   = $4, \
             parent_id  = $5, \
             is_active  = $6, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {MENU_COLUMNS}"
    ))
    .bind(id)
    .bind(&menu.name)
    .bind(&menu.link)
    .bind(menu.position)
    .bind(menu.parent_id)
    .bind(menu.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist.
pub async fn delete_menu(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM menus WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
