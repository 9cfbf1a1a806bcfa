use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use kidshop_core::StatsFilter;
use kidshop_db::DashboardStats;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct StatsQuery {
    pub filter: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// GET /api/admin/stats: dashboard totals for a date filter.
pub(super) async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let range = StatsFilter::from_query(query.filter.as_deref(), query.month, query.year)
        .and_then(|filter| filter.date_range(Utc::now()))
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let stats = kidshop_db::dashboard_stats(&state.pool, range)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(req_id.0, stats))
}
