//! Admin dashboard aggregation.

use kidshop_core::{DateRange, LOW_STOCK_THRESHOLD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub profit: Decimal,
    pub pending_orders: i64,
    pub delivered_orders: i64,
    pub low_stock_items: i64,
    pub status_distribution: Vec<DistributionEntry>,
    pub source_distribution: Vec<DistributionEntry>,
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    pending_orders: i64,
    delivered_orders: i64,
    total_revenue: Decimal,
    total_cost: Decimal,
    total_products: i64,
    low_stock_items: i64,
    status_distribution: Json<Vec<DistributionEntry>>,
    source_distribution: Json<Vec<DistributionEntry>>,
}

// Order counts, revenue, cost and distributions honour the date range;
// product counts do not. A delivered order without items counts as one
// unit priced at the order total with zero cost.
const STATS_SQL: &str = "\
WITH scoped AS ( \
    SELECT id, status, order_source, total_price \
    FROM orders \
    WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
      AND ($2::timestamptz IS NULL OR created_at <= $2) \
), \
delivered AS ( \
    SELECT id, total_price FROM scoped WHERE status ~* 'delivered|complete' \
), \
delivered_lines AS ( \
    SELECT \
        COALESCE(oi.price, d.total_price) AS price, \
        COALESCE(oi.quantity, 1) AS quantity, \
        COALESCE(oi.purchase_price, p.purchase_price, 0) AS unit_cost \
    FROM delivered d \
    LEFT JOIN order_items oi ON oi.order_id = d.id \
    LEFT JOIN products p ON p.id = oi.product_id \
), \
status_counts AS ( \
    SELECT status AS key, COUNT(*) AS count FROM scoped GROUP BY status \
), \
source_counts AS ( \
    SELECT order_source AS key, COUNT(*) AS count FROM scoped GROUP BY order_source \
) \
SELECT \
    (SELECT COUNT(*) FROM scoped) AS total_orders, \
    (SELECT COUNT(*) FROM scoped WHERE status ILIKE '%pending%') AS pending_orders, \
    (SELECT COUNT(*) FROM delivered) AS delivered_orders, \
    (SELECT COALESCE(SUM(price * quantity), 0)::numeric FROM delivered_lines) AS total_revenue, \
    (SELECT COALESCE(SUM(unit_cost * quantity), 0)::numeric FROM delivered_lines) AS total_cost, \
    (SELECT COUNT(*) FROM products) AS total_products, \
    (SELECT COUNT(*) FROM products p \
      WHERE EXISTS ( \
          SELECT 1 FROM product_variants v WHERE v.product_id = p.id AND v.stock < $3 \
      )) AS low_stock_items, \
    (SELECT COALESCE( \
         json_agg(json_build_object('_id', key, 'count', count) ORDER BY count DESC, key), \
         '[]'::json) \
     FROM status_counts) AS status_distribution, \
    (SELECT COALESCE( \
         json_agg(json_build_object('_id', key, 'count', count) ORDER BY count DESC, key), \
         '[]'::json) \
     FROM source_counts) AS source_distribution";

/// Computes the dashboard summary in a single statement.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn dashboard_stats(pool: &PgPool, range: DateRange) -> Result<DashboardStats, DbError> {
    let row = sqlx::query_as::<_, StatsRow>(STATS_SQL)
        .bind(range.start)
        .bind(range.end)
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_products: row.total_products,
        total_orders: row.total_orders,
        total_revenue: row.total_revenue,
        profit: row.total_revenue - row.total_cost,
        pending_orders: row.pending_orders,
        delivered_orders: row.delivered_orders,
        low_stock_items: row.low_stock_items,
        status_distribution: row.status_distribution.0,
        source_distribution: row.source_distribution.0,
    })
}
