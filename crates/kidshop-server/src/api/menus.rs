use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use kidshop_db::{MenuRow, MenuWrite};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_lookup_error, parse_id, ApiError, ApiResponse, AppState, Deleted};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MenuBody {
    #[serde(default, alias = "_id")]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    position: i32,
    parent_id: Option<i64>,
    #[serde(default = "default_active")]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct MenuIdQuery {
    id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl MenuBody {
    fn validated(&self, req_id: &str) -> Result<MenuWrite, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::new(req_id, "validation_error", "Menu name is required"));
        }
        Ok(MenuWrite {
            name: self.name.trim().to_string(),
            link: self.link.trim().to_string(),
            position: self.position,
            parent_id: self.parent_id,
            is_active: self.is_active,
        })
    }

    fn menu_id(&self, req_id: &str) -> Result<i64, ApiError> {
        match &self.id {
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .filter(|id| *id > 0)
                .ok_or_else(|| ApiError::new(req_id, "validation_error", "Invalid menu ID")),
            Some(serde_json::Value::String(s)) => parse_id(req_id, s, "menu"),
            _ => Err(ApiError::new(req_id, "validation_error", "Menu ID is required")),
        }
    }
}

pub(super) async fn list_menus(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<MenuRow>>>, ApiError> {
    let menus = kidshop_db::list_menus(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, menus))
}

pub(super) async fn create_menu(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<MenuBody>,
) -> Result<(StatusCode, Json<ApiResponse<MenuRow>>), ApiError> {
    let menu = body.validated(&req_id.0)?;
    let row = kidshop_db::create_menu(&state.pool, &menu)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, row)))
}

/// PUT /api/menus: the menu id travels in the body.
pub(super) async fn update_menu(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<MenuBody>,
) -> Result<Json<ApiResponse<MenuRow>>, ApiError> {
    let id = body.menu_id(&req_id.0)?;
    let menu = body.validated(&req_id.0)?;
    let row = kidshop_db::update_menu(&state.pool, id, &menu)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Menu"))?;
    Ok(ApiResponse::json(req_id.0, row))
}

/// DELETE /api/menus?id=
pub(super) async fn delete_menu(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MenuIdQuery>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let raw = query
        .id
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "validation_error", "Menu ID is required"))?;
    let id = parse_id(&req_id.0, &raw, "menu")?;
    kidshop_db::delete_menu(&state.pool, id)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Menu"))?;
    Ok(ApiResponse::json(req_id.0, Deleted::new("Menu deleted successfully")))
}
