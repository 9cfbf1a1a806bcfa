//! Database operations for `sliders`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// One slide in a carousel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Slide {
    pub image: String,
    pub link: String,
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SliderRow {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub slides: Json<Vec<Slide>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SliderWrite {
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub slides: Vec<Slide>,
}

const SLIDER_COLUMNS: &str = "id, name, location, is_active, slides, created_at, updated_at";

/// Sliders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sliders(pool: &PgPool) -> Result<Vec<SliderRow>, DbError> {
    let rows = sqlx::query_as::<_, SliderRow>(&format!(
        "SELECT {SLIDER_COLUMNS} FROM sliders ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on failure; a second slider at the same
/// location is a unique violation.
pub async fn create_slider(pool: &PgPool, slider: &SliderWrite) -> Result<SliderRow, DbError> {
    let row = sqlx::query_as::<_, SliderRow>(&format!(
        "INSERT INTO sliders (name, location, is_active, slides) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {SLIDER_COLUMNS}"
    ))
    .bind(&slider.name)
    .bind(&slider.location)
    .bind(slider.is_active)
    .bind(Json(&slider.slides))
    .fetch_one(pool)
    .await?;
    Ok(row)
}
