use axum::{extract::State, Extension, Json};
use kidshop_core::{CourierSettings, GeneralSettings, GeneralSettingsUpdate};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

pub(super) async fn get_general(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<GeneralSettings>>, ApiError> {
    let settings = kidshop_db::get_general_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, settings))
}

/// PUT /api/settings: overlays the given fields on the stored document.
pub(super) async fn put_general(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(update): Json<GeneralSettingsUpdate>,
) -> Result<Json<ApiResponse<GeneralSettings>>, ApiError> {
    let current = kidshop_db::get_general_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let saved = kidshop_db::save_general_settings(&state.pool, &update.apply(current))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!("general settings updated");
    Ok(ApiResponse::json(req_id.0, saved))
}

pub(super) async fn get_courier(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CourierSettings>>, ApiError> {
    let settings = kidshop_db::get_courier_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, settings))
}

/// PUT /api/settings/courier: replaces the provider list.
pub(super) async fn put_courier(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(settings): Json<CourierSettings>,
) -> Result<Json<ApiResponse<CourierSettings>>, ApiError> {
    let saved = kidshop_db::save_courier_settings(&state.pool, &settings)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(providers = saved.providers.len(), "courier settings updated");
    Ok(ApiResponse::json(req_id.0, saved))
}
