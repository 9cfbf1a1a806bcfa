use axum::{extract::State, http::StatusCode, Extension, Json};
use kidshop_db::{Slide, SliderRow, SliderWrite};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SliderBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    slides: Vec<Slide>,
}

fn default_active() -> bool {
    true
}

pub(super) async fn list_sliders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SliderRow>>>, ApiError> {
    let sliders = kidshop_db::list_sliders(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, sliders))
}

pub(super) async fn create_slider(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SliderBody>,
) -> Result<(StatusCode, Json<ApiResponse<SliderRow>>), ApiError> {
    let name = body.name.trim();
    let location = body.location.trim();
    if name.is_empty() || location.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "Slider name and location are required",
        ));
    }

    let slider = SliderWrite {
        name: name.to_string(),
        location: location.to_string(),
        is_active: body.is_active,
        slides: body.slides,
    };
    let row = kidshop_db::create_slider(&state.pool, &slider)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::new(
                    req_id.0.clone(),
                    "validation_error",
                    "A slider with this location already exists",
                )
            } else {
                map_db_error(req_id.0.clone(), &e)
            }
        })?;
    tracing::info!(slider_id = row.id, location = %row.location, "slider created");

    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, row)))
}
