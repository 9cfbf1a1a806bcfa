//! Singleton settings rows. Each table holds at most one row, keyed by
//! `id = TRUE`, whose `settings` column is the typed document.

use kidshop_core::{CourierSettings, GeneralSettings};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// Stored general settings, or the defaults when none have been saved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or the stored document no
/// longer decodes.
pub async fn get_general_settings(pool: &PgPool) -> Result<GeneralSettings, DbError> {
    let stored = sqlx::query_scalar::<_, Json<GeneralSettings>>(
        "SELECT settings FROM general_settings WHERE id",
    )
    .fetch_optional(pool)
    .await?;
    Ok(stored.map(|Json(s)| s).unwrap_or_default())
}

/// Upserts the general settings singleton and returns what was stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn save_general_settings(
    pool: &PgPool,
    settings: &GeneralSettings,
) -> Result<GeneralSettings, DbError> {
    let Json(saved) = sqlx::query_scalar::<_, Json<GeneralSettings>>(
        "INSERT INTO general_settings (id, settings) VALUES (TRUE, $1) \
         ON CONFLICT (id) DO UPDATE SET \
             settings   = EXCLUDED.settings, \
             updated_at = NOW() \
         RETURNING settings",
    )
    .bind(Json(settings))
    .fetch_one(pool)
    .await?;
    Ok(saved)
}

/// Stored courier settings, or a single active Steadfast provider with
/// empty keys.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_courier_settings(pool: &PgPool) -> Result<CourierSettings, DbError> {
    let stored = sqlx::query_scalar::<_, Json<CourierSettings>>(
        "SELECT settings FROM courier_settings WHERE id",
    )
    .fetch_optional(pool)
    .await?;
    Ok(stored.map(|Json(s)| s).unwrap_or_default())
}

/// Upserts the courier settings singleton and returns what was stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn save_courier_settings(
    pool: &PgPool,
    settings: &CourierSettings,
) -> Result<CourierSettings, DbError> {
    let Json(saved) = sqlx::query_scalar::<_, Json<CourierSettings>>(
        "INSERT INTO courier_settings (id, settings) VALUES (TRUE, $1) \
         ON CONFLICT (id) DO UPDATE SET \
             settings   = EXCLUDED.settings, \
             updated_at = NOW() \
         RETURNING settings",
    )
    .bind(Json(settings))
    .fetch_one(pool)
    .await?;
    Ok(saved)
}
