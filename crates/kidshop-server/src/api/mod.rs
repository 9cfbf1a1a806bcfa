mod admin;
mod cart;
mod categories;
mod combos;
mod courier;
mod form;
mod menus;
mod orders;
mod products;
mod settings;
mod sliders;
mod stats;
mod upload;

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kidshop_core::AppConfig;
use kidshop_courier::SteadfastClient;
use kidshop_db::{DbError, OrderError};
use kidshop_media::CloudinaryClient;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AdminAuth;
use crate::middleware::{enforce_rate_limit, request_id, require_admin, RateLimitState, RequestId};

/// Product forms carry up to eleven images.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AdminAuth,
    pub courier: SteadfastClient,
    pub media: Option<CloudinaryClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    message: &'static str,
}

impl Deleted {
    pub(super) fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn json(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "insufficient_stock" | "minimum_quantity" => {
                StatusCode::BAD_REQUEST
            }
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        DbError::Core(core) => ApiError::new(request_id, "validation_error", core.to_string()),
        e if e.is_unique_violation() => {
            ApiError::new(request_id, "conflict", "a record with that key already exists")
        }
        e => {
            tracing::error!(error = %e, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

/// Like [`map_db_error`] but names the missing entity in a 404.
pub(super) fn map_lookup_error(request_id: String, error: &DbError, entity: &str) -> ApiError {
    if matches!(error, DbError::NotFound) {
        return ApiError::new(request_id, "not_found", format!("{entity} not found"));
    }
    map_db_error(request_id, error)
}

pub(super) fn map_order_error(request_id: String, error: &OrderError) -> ApiError {
    let code = match error {
        OrderError::Validation(_) | OrderError::InvalidProductId(_) => "validation_error",
        OrderError::MinimumQuantity { .. } => "minimum_quantity",
        OrderError::ProductNotFound(_) | OrderError::VariantNotFound { .. } => "not_found",
        OrderError::InsufficientStock { .. } | OrderError::PlacementFailed { .. } => {
            "insufficient_stock"
        }
        OrderError::Db(db) => return map_db_error(request_id, db),
    };
    ApiError::new(request_id, code, error.to_string())
}

/// Parses a path or query id, answering 400 `Invalid <what> ID` otherwise.
pub(super) fn parse_id(request_id: &str, raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::new(request_id, "validation_error", format!("Invalid {what} ID")))
}

/// Ids in a JSON array may be numbers or numeric strings.
pub(super) fn parse_id_list(
    request_id: &str,
    raw: &[serde_json::Value],
    what: &str,
) -> Result<Vec<i64>, ApiError> {
    raw.iter()
        .map(|value| match value {
            serde_json::Value::Number(n) => n.as_i64().filter(|id| *id > 0).ok_or_else(|| {
                ApiError::new(request_id, "validation_error", format!("Invalid {what} ID"))
            }),
            serde_json::Value::String(s) => parse_id(request_id, s, what),
            _ => Err(ApiError::new(
                request_id,
                "validation_error",
                format!("Invalid {what} ID"),
            )),
        })
        .collect()
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    ApiError::new("", "internal_error", "Internal server error").into_response()
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/categories", get(categories::category_tree))
        .route("/api/categories/flat", get(categories::flat_categories))
        .route("/api/combos", get(combos::list_combos))
        .route("/api/combos/{id}", get(combos::get_combo))
        .route("/api/menus", get(menus::list_menus))
        .route("/api/sliders", get(sliders::list_sliders))
        .route("/api/checkout", post(orders::checkout))
        .route("/api/orders", post(orders::create_order))
        .route("/api/comboorder", post(orders::create_combo_order))
        .route("/api/cart/validate", post(cart::validate_cart))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", axum::routing::delete(admin::logout))
        .route("/api/admin/check", get(admin::check))
}

fn admin_router(auth: AdminAuth, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/products", post(products::create_product))
        .route("/api/stock", get(products::list_stock))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/{id}", axum::routing::patch(orders::update_order))
        .route("/api/comboorder", get(orders::list_combo_orders))
        .route("/api/admin/stats", get(stats::dashboard_stats))
        .route("/api/categories", post(categories::create_category))
        .route(
            "/api/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/api/combos", post(combos::create_combo))
        .route(
            "/api/combos/{id}",
            put(combos::update_combo).delete(combos::delete_combo),
        )
        .route(
            "/api/menus",
            post(menus::create_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/api/sliders", post(sliders::create_slider))
        .route(
            "/api/settings",
            get(settings::get_general).put(settings::put_general),
        )
        .route(
            "/api/settings/courier",
            get(settings::get_courier).put(settings::put_courier),
        )
        .route("/api/courier/create-order", post(courier::create_order))
        .route("/api/courier/check-status", get(courier::check_status))
        .route("/api/upload", post(upload::upload_image))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(auth, require_admin)),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let cors = build_cors(&state.config.cors_origins);

    Router::new()
        .merge(public_router())
        .merge(admin_router(state.auth.clone(), rate_limit))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "API is running..."
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match kidshop_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
