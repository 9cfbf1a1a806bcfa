use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use kidshop_courier::{CourierError, CourierOrderInput, SteadfastCredentials};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CreateCourierOrdersBody {
    #[serde(default)]
    orders: Vec<CourierOrderInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StatusQuery {
    consignment_id: Option<String>,
}

fn map_courier_error(request_id: String, error: &CourierError) -> ApiError {
    match error {
        CourierError::MissingCredentials
        | CourierError::EmptyBatch
        | CourierError::InvalidOrder(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        e => {
            tracing::error!(error = %e, "steadfast request failed");
            ApiError::new(request_id, "upstream_error", e.to_string())
        }
    }
}

async fn load_credentials(state: &AppState, req_id: &str) -> Result<SteadfastCredentials, ApiError> {
    let courier = kidshop_db::get_courier_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    let general = kidshop_db::get_general_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    kidshop_courier::resolve_credentials(&courier, &general)
        .map_err(|e| map_courier_error(req_id.to_string(), &e))
}

/// POST /api/courier/create-order: books consignments and records them on
/// the matching orders. Returns the courier's raw response.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCourierOrdersBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = req_id.0.as_str();
    let orders = kidshop_courier::prepare_orders(&body.orders)
        .map_err(|e| map_courier_error(req_id.0.clone(), &e))?;
    let credentials = load_credentials(&state, rid).await?;

    let outcome = state
        .courier
        .create_orders(&credentials, &orders)
        .await
        .map_err(|e| map_courier_error(req_id.0.clone(), &e))?;

    for created in &outcome.created {
        let matched = kidshop_db::mark_sent_to_courier(
            &state.pool,
            &created.invoice,
            &created.consignment_id,
            created.tracking_code.as_deref(),
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        if matched {
            tracing::info!(
                invoice = %created.invoice,
                consignment_id = %created.consignment_id,
                "order sent to courier"
            );
        } else {
            tracing::warn!(invoice = %created.invoice, "consignment created for unknown order");
        }
    }

    Ok(ApiResponse::json(req_id.0, outcome.raw))
}

/// GET /api/courier/check-status?consignmentId=
pub(super) async fn check_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = req_id.0.as_str();
    let consignment_id = query
        .consignment_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::new(rid, "validation_error", "Consignment ID is required"))?;
    let credentials = load_credentials(&state, rid).await?;

    let outcome = state
        .courier
        .status_by_consignment(&credentials, &consignment_id)
        .await
        .map_err(|e| map_courier_error(req_id.0.clone(), &e))?;

    if let Some(status) = outcome.delivery_status.as_deref() {
        let updated =
            kidshop_db::mark_courier_status(&state.pool, &consignment_id, status, Utc::now())
                .await
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
        tracing::debug!(
            consignment_id = %consignment_id,
            status,
            updated,
            "courier status mirrored"
        );
    }

    Ok(ApiResponse::json(req_id.0, outcome.raw))
}
