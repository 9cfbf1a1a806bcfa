use axum::{extract::State, Extension, Json};
use kidshop_core::VariantDescriptor;
use kidshop_db::{CartLine, CartReport};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartItemBody {
    #[serde(default)]
    pub product_id: serde_json::Value,
    #[serde(default)]
    pub quantity: i64,
    #[serde(flatten)]
    pub descriptor: VariantDescriptor,
}

#[derive(Debug, Deserialize)]
pub(super) struct CartBody {
    #[serde(default)]
    pub items: Vec<CartItemBody>,
}

/// POST /api/cart/validate: read-only availability report.
pub(super) async fn validate_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CartBody>,
) -> Result<Json<ApiResponse<CartReport>>, ApiError> {
    if body.items.is_empty() {
        return Err(ApiError::new(req_id.0, "validation_error", "No items in cart"));
    }

    let lines: Vec<CartLine> = body
        .items
        .into_iter()
        .map(|item| CartLine {
            product_ref: match item.product_id {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                _ => String::new(),
            },
            descriptor: item.descriptor,
            quantity: item.quantity,
        })
        .collect();

    let report = kidshop_db::check_cart(&state.pool, &lines)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(req_id.0, report))
}
