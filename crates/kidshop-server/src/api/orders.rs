//! Order placement, combo orders, and the admin order list.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use kidshop_core::VariantDescriptor;
use kidshop_db::{
    ComboOrderLine, ComboOrderRequest, NewOrderLine, OrderKind, OrderListing, OrderMetadata,
    OrderRequest, OrderRow, PlacedOrder, PlacementMode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_lookup_error, map_order_error, parse_id, ApiError, ApiResponse, AppState,
};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct OrderItemBody {
    pub product_id: serde_json::Value,
    pub quantity: i64,
    pub price: Decimal,
    pub sku: Option<String>,
    pub design: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct CheckoutBody {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub items: Vec<OrderItemBody>,
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct CreateOrderBody {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    #[serde(alias = "customerPhone")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub items: Vec<OrderItemBody>,
    pub total_price: Option<Decimal>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub order_source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct ComboItemBody {
    #[serde(alias = "_id", alias = "id")]
    pub combo_id: serde_json::Value,
    #[serde(alias = "title")]
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct ComboOrderBody {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    #[serde(alias = "customerPhone")]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    #[serde(alias = "products")]
    pub items: Vec<ComboItemBody>,
    pub total_price: Option<Decimal>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub order_source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateOrderBody {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping helpers
// ---------------------------------------------------------------------------

/// Renders an id the client may send as a string or a number.
fn reference_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn order_line(item: OrderItemBody, with_sku: bool) -> NewOrderLine {
    NewOrderLine {
        product_ref: reference_string(&item.product_id),
        descriptor: VariantDescriptor {
            sku: if with_sku { item.sku } else { None },
            design: item.design,
            color: item.color,
            size: item.size,
        },
        quantity: item.quantity,
        price: item.price,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn note_client_total(client_total: Option<Decimal>, placed: &PlacedOrder) {
    if let Some(client_total) = client_total {
        if client_total != placed.total_price {
            tracing::warn!(
                order_number = %placed.order_number,
                client_total = %client_total,
                computed_total = %placed.total_price,
                "client totalPrice differs from computed total; using computed"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/checkout: cart checkout; at least three units.
pub(super) async fn checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedOrder>>), ApiError> {
    let request = OrderRequest {
        mode: PlacementMode::Checkout,
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
        address: body.address,
        note: body.note,
        items: body
            .items
            .into_iter()
            .map(|item| order_line(item, false))
            .collect(),
        metadata: OrderMetadata::default(),
    };

    let placed = kidshop_db::place_order(&state.pool, &request, Utc::now())
        .await
        .map_err(|e| map_order_error(req_id.0.clone(), &e))?;
    note_client_total(body.total_price, &placed);
    tracing::info!(order_number = %placed.order_number, "checkout order placed");

    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, placed)))
}

/// POST /api/orders: direct order; variants matched by SKU when given.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedOrder>>), ApiError> {
    let request = OrderRequest {
        mode: PlacementMode::Direct,
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.phone,
        address: body.address,
        note: body.note,
        items: body
            .items
            .into_iter()
            .map(|item| order_line(item, true))
            .collect(),
        metadata: OrderMetadata {
            status: non_blank(body.status),
            payment_status: non_blank(body.payment_status),
            order_source: non_blank(body.order_source),
        },
    };

    let placed = kidshop_db::place_order(&state.pool, &request, Utc::now())
        .await
        .map_err(|e| map_order_error(req_id.0.clone(), &e))?;
    note_client_total(body.total_price, &placed);
    tracing::info!(order_number = %placed.order_number, "order placed");

    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, placed)))
}

/// POST /api/comboorder: combo bundles; no stock effect.
pub(super) async fn create_combo_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ComboOrderBody>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedOrder>>), ApiError> {
    let rid = req_id.0.as_str();
    let mut items = Vec::with_capacity(body.items.len());
    for item in body.items {
        let raw = reference_string(&item.combo_id);
        let combo_id = if raw.trim().is_empty() {
            None
        } else {
            Some(parse_id(rid, &raw, "combo")?)
        };
        items.push(ComboOrderLine {
            combo_id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
            size: non_blank(item.size),
        });
    }

    let request = ComboOrderRequest {
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.phone,
        address: body.address,
        note: body.note,
        items,
        metadata: OrderMetadata {
            status: non_blank(body.status),
            payment_status: non_blank(body.payment_status),
            order_source: non_blank(body.order_source),
        },
    };

    let placed = kidshop_db::place_combo_order(&state.pool, &request, Utc::now())
        .await
        .map_err(|e| map_order_error(req_id.0.clone(), &e))?;
    note_client_total(body.total_price, &placed);
    tracing::info!(order_number = %placed.order_number, "combo order placed");

    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, placed)))
}

async fn list_by_kind(
    state: &AppState,
    req_id: RequestId,
    kind: OrderKind,
    query: OrderListQuery,
) -> Result<Json<ApiResponse<OrderListing>>, ApiError> {
    let listing = kidshop_db::list_orders(
        &state.pool,
        kind,
        query.status.as_deref(),
        query.limit,
        query.skip,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, listing))
}

/// GET /api/orders: product orders, newest first.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<OrderListing>>, ApiError> {
    list_by_kind(&state, req_id, OrderKind::Product, query).await
}

/// GET /api/comboorder: combo orders, newest first.
pub(super) async fn list_combo_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<OrderListing>>, ApiError> {
    list_by_kind(&state, req_id, OrderKind::Combo, query).await
}

/// PATCH /api/orders/{id}: order and payment status.
pub(super) async fn update_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<UpdateOrderBody>,
) -> Result<Json<ApiResponse<OrderRow>>, ApiError> {
    let rid = req_id.0.as_str();
    let id = parse_id(rid, &id, "order")?;
    let status = non_blank(body.status);
    let payment_status = non_blank(body.payment_status);
    if status.is_none() && payment_status.is_none() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "status or paymentStatus is required",
        ));
    }

    let order = kidshop_db::update_order_status(
        &state.pool,
        id,
        status.as_deref(),
        payment_status.as_deref(),
    )
    .await
    .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Order"))?;

    Ok(ApiResponse::json(req_id.0, order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_body_reads_camel_case_and_string_ids() {
        let body: CheckoutBody = serde_json::from_value(serde_json::json!({
            "customerName": "Rina",
            "customerEmail": "rina@example.com",
            "items": [
                {"productId": "12", "quantity": 2, "price": "450.00",
                 "design": "Floral", "color": "Red", "size": "2Y"},
                {"productId": 13, "quantity": 1, "price": 300}
            ],
            "totalPrice": 1200
        }))
        .expect("checkout body");

        let lines: Vec<NewOrderLine> = body
            .items
            .into_iter()
            .map(|item| order_line(item, false))
            .collect();
        assert_eq!(lines[0].product_ref, "12");
        assert_eq!(lines[1].product_ref, "13");
        assert_eq!(lines[0].descriptor.design.as_deref(), Some("Floral"));
        assert_eq!(lines[0].price, Decimal::new(450, 0));
    }

    #[test]
    fn checkout_ignores_sku_but_direct_orders_keep_it() {
        let item = || OrderItemBody {
            product_id: serde_json::json!("5"),
            quantity: 1,
            price: Decimal::ONE,
            sku: Some("KS-RED-2Y".to_string()),
            ..OrderItemBody::default()
        };
        assert!(order_line(item(), false).descriptor.sku.is_none());
        assert_eq!(
            order_line(item(), true).descriptor.sku.as_deref(),
            Some("KS-RED-2Y")
        );
    }

    #[test]
    fn combo_body_accepts_products_alias() {
        let body: ComboOrderBody = serde_json::from_value(serde_json::json!({
            "customerName": "Rina",
            "phone": "01712345678",
            "address": "Dhaka",
            "note": "call first",
            "products": [{"_id": "4", "title": "Summer Trio", "quantity": 1, "price": 1500}]
        }))
        .expect("combo body");
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].name, "Summer Trio");
        assert_eq!(reference_string(&body.items[0].combo_id), "4");
    }
}
