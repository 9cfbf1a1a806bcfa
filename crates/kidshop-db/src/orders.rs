//! Database operations for `orders`, `order_items`, and `daily_sales`.
//!
//! Placement runs as one transaction: the order row, its items, the stock
//! decrements and the daily-sales rollup commit together or not at all.
//! Stock is decremented with a conditional `UPDATE ... WHERE stock >= $q`,
//! so two concurrent orders can never drive a variant below zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kidshop_core::{
    generate_order_number, round_price, summarize_lines, validate_checkout_quantity, CoreError,
    OrderLine, VariantDescriptor,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crate::products::load_products_with_variants;
use crate::DbError;

const MAX_LIST_LIMIT: i64 = 200;

/// Courier statuses after which a consignment is no longer polled.
const FINAL_COURIER_STATUSES: &[&str] = &["delivered", "partial_delivered", "cancelled"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Minimum order quantity is {minimum} items. Currently: {actual}")]
    MinimumQuantity { minimum: i64, actual: i64 },

    #[error("Invalid product ID: {0}")]
    InvalidProductId(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Variant not found for product {product} ({descriptor})")]
    VariantNotFound { product: String, descriptor: String },

    #[error("Insufficient stock for {product} - {variant}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        variant: String,
        available: i64,
        requested: i64,
    },

    /// The conditional decrement matched no row: stock moved between the
    /// availability check and the write. The transaction is rolled back.
    #[error("Insufficient stock for {product} - {variant}. Available: {available}, Requested: {requested}")]
    PlacementFailed {
        product: String,
        variant: String,
        available: i64,
        requested: i64,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Db(DbError::Sqlx(err))
    }
}

impl From<CoreError> for OrderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MinimumQuantity { minimum, actual } => {
                OrderError::MinimumQuantity { minimum, actual }
            }
            other => OrderError::Validation(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub total_price: Decimal,
    pub total_items: i64,
    pub status: String,
    pub payment_status: String,
    pub order_source: String,
    pub product_type: String,
    pub consignment_id: Option<String>,
    pub tracking_code: Option<String>,
    pub courier_status: Option<String>,
    pub courier_last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub combo_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub purchase_price: Option<Decimal>,
    pub design: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListing {
    pub orders: Vec<OrderWithItems>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub id: i64,
    pub order_number: String,
    pub total_price: Decimal,
    pub total_items: i64,
}

/// Value of the `orders.product_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Product,
    Combo,
}

impl OrderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Product => "product",
            OrderKind::Combo => "combo",
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Which storefront flow an order comes from; they differ in required
/// customer fields and in the checkout quantity minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Cart checkout: name and email required, at least three units.
    Checkout,
    /// Direct order: name, address, note and phone required.
    Direct,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Product reference exactly as the client sent it.
    pub product_ref: String,
    pub descriptor: VariantDescriptor,
    pub quantity: i64,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct OrderMetadata {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub order_source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub mode: PlacementMode,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub items: Vec<NewOrderLine>,
    pub metadata: OrderMetadata,
}

#[derive(Debug, Clone)]
pub struct ComboOrderLine {
    pub combo_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub size: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ComboOrderRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub items: Vec<ComboOrderLine>,
    pub metadata: OrderMetadata,
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl OrderRequest {
    /// Checks required customer fields and that there is at least one line.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] naming what is missing.
    pub fn validate(&self) -> Result<(), OrderError> {
        let missing_customer = match self.mode {
            PlacementMode::Checkout => {
                !present(self.customer_name.as_ref()) || !present(self.customer_email.as_ref())
            }
            PlacementMode::Direct => {
                !present(self.customer_name.as_ref())
                    || !present(self.address.as_ref())
                    || !present(self.note.as_ref())
                    || !present(self.customer_phone.as_ref())
            }
        };
        if missing_customer || self.items.is_empty() {
            return Err(OrderError::Validation("Missing required fields".to_string()));
        }
        Ok(())
    }

    fn lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    }
}

impl ComboOrderRequest {
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] if name, address, note, phone or
    /// items are missing.
    pub fn validate(&self) -> Result<(), OrderError> {
        if !present(self.customer_name.as_ref())
            || !present(self.address.as_ref())
            || !present(self.note.as_ref())
            || !present(self.customer_phone.as_ref())
            || self.items.is_empty()
        {
            return Err(OrderError::Validation("Missing required fields".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Units requested from one variant, summed across every line that hits it.
struct VariantDemand {
    variant_id: i64,
    product_name: String,
    label: String,
    available: i64,
    requested: i64,
}

struct ResolvedLine {
    product_id: i64,
    product_name: String,
    purchase_price: Option<Decimal>,
    design: String,
    color: String,
    size: String,
    sku: Option<String>,
    quantity: i64,
    price: Decimal,
}

/// Places a product order.
///
/// Validation runs first (required fields, quantities, the checkout
/// minimum, product and variant resolution, summed stock). Then, inside a
/// single transaction, the order and its items are inserted, each distinct
/// variant is decremented in ascending id order, and today's daily-sales row
/// is upserted. Line prices are rounded to cents before anything is
/// summed, so the total is always `Σ price × quantity` over the stored lines.
///
/// # Errors
///
/// Returns the [`OrderError`] variant for the first rule that fails. Any
/// error after the transaction opens rolls back every write.
pub async fn place_order(
    pool: &PgPool,
    request: &OrderRequest,
    now: DateTime<Utc>,
) -> Result<PlacedOrder, OrderError> {
    request.validate()?;
    let totals = summarize_lines(&request.lines())?;
    if request.mode == PlacementMode::Checkout {
        validate_checkout_quantity(totals.total_items)?;
    }

    let mut ids = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let id = item
            .product_ref
            .trim()
            .parse::<i64>()
            .map_err(|_| OrderError::InvalidProductId(item.product_ref.clone()))?;
        ids.push(id);
    }

    let mut tx = pool.begin().await?;
    let products = load_products_with_variants(&mut tx, &ids).await?;

    let mut resolved = Vec::with_capacity(request.items.len());
    let mut demands: Vec<VariantDemand> = Vec::new();
    let mut demand_index: HashMap<i64, usize> = HashMap::new();

    for (item, product_id) in request.items.iter().zip(&ids) {
        let product = products
            .get(product_id)
            .ok_or_else(|| OrderError::ProductNotFound(item.product_ref.clone()))?;
        let variant = item.descriptor.find_in(&product.variants).ok_or_else(|| {
            OrderError::VariantNotFound {
                product: product.product.name.clone(),
                descriptor: item.descriptor.describe(),
            }
        })?;

        let slot = *demand_index.entry(variant.id).or_insert_with(|| {
            demands.push(VariantDemand {
                variant_id: variant.id,
                product_name: product.product.name.clone(),
                label: item.descriptor.short_label(),
                available: i64::from(variant.stock),
                requested: 0,
            });
            demands.len() - 1
        });
        demands[slot].requested += item.quantity;

        resolved.push(ResolvedLine {
            product_id: *product_id,
            product_name: product.product.name.clone(),
            purchase_price: product.product.purchase_price,
            design: variant.design.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            sku: variant.sku.clone(),
            quantity: item.quantity,
            price: round_price(item.price),
        });
    }

    if let Some(short) = demands.iter().find(|d| d.requested > d.available) {
        return Err(OrderError::InsufficientStock {
            product: short.product_name.clone(),
            variant: short.label.clone(),
            available: short.available,
            requested: short.requested,
        });
    }

    let order_number = generate_order_number(now);
    let order_id = insert_order(
        &mut tx,
        &OrderHeader {
            order_number: &order_number,
            customer_name: request.customer_name.as_deref().unwrap_or_default(),
            customer_email: request.customer_email.as_deref(),
            customer_phone: request.customer_phone.as_deref(),
            address: request.address.as_deref(),
            note: request.note.as_deref(),
            total_price: totals.total_price,
            total_items: totals.total_items,
            metadata: &request.metadata,
            kind: OrderKind::Product,
            now,
        },
    )
    .await?;

    for line in &resolved {
        sqlx::query(
            "INSERT INTO order_items \
                 (order_id, product_id, product_name, quantity, price, purchase_price, \
                  design, color, size, sku) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.purchase_price)
        .bind(&line.design)
        .bind(&line.color)
        .bind(&line.size)
        .bind(&line.sku)
        .execute(&mut *tx)
        .await?;
    }

    demands.sort_by_key(|d| d.variant_id);
    for demand in &demands {
        decrement_stock(&mut tx, demand).await?;
    }

    upsert_daily_sales(&mut tx, now, totals.total_price, totals.total_items).await?;
    tx.commit().await?;

    Ok(PlacedOrder {
        id: order_id,
        order_number,
        total_price: totals.total_price,
        total_items: totals.total_items,
    })
}

/// Places a combo order. Combos carry no stock, so only the order, its
/// items, and the daily-sales rollup are written.
///
/// # Errors
///
/// Returns [`OrderError::Validation`] for missing fields or bad lines, or
/// [`OrderError::Db`] if a write fails (nothing is persisted).
pub async fn place_combo_order(
    pool: &PgPool,
    request: &ComboOrderRequest,
    now: DateTime<Utc>,
) -> Result<PlacedOrder, OrderError> {
    request.validate()?;
    let lines: Vec<OrderLine> = request
        .items
        .iter()
        .map(|item| OrderLine {
            quantity: item.quantity,
            price: item.price,
        })
        .collect();
    let totals = summarize_lines(&lines)?;

    let mut tx = pool.begin().await?;
    let order_number = generate_order_number(now);
    let order_id = insert_order(
        &mut tx,
        &OrderHeader {
            order_number: &order_number,
            customer_name: request.customer_name.as_deref().unwrap_or_default(),
            customer_email: request.customer_email.as_deref(),
            customer_phone: request.customer_phone.as_deref(),
            address: request.address.as_deref(),
            note: request.note.as_deref(),
            total_price: totals.total_price,
            total_items: totals.total_items,
            metadata: &request.metadata,
            kind: OrderKind::Combo,
            now,
        },
    )
    .await?;

    for item in &request.items {
        sqlx::query(
            "INSERT INTO order_items \
                 (order_id, combo_id, product_name, quantity, price, size) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(item.combo_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(round_price(item.price))
        .bind(&item.size)
        .execute(&mut *tx)
        .await?;
    }

    upsert_daily_sales(&mut tx, now, totals.total_price, totals.total_items).await?;
    tx.commit().await?;

    Ok(PlacedOrder {
        id: order_id,
        order_number,
        total_price: totals.total_price,
        total_items: totals.total_items,
    })
}

struct OrderHeader<'a> {
    order_number: &'a str,
    customer_name: &'a str,
    customer_email: Option<&'a str>,
    customer_phone: Option<&'a str>,
    address: Option<&'a str>,
    note: Option<&'a str>,
    total_price: Decimal,
    total_items: i64,
    metadata: &'a OrderMetadata,
    kind: OrderKind,
    now: DateTime<Utc>,
}

async fn insert_order(conn: &mut PgConnection, header: &OrderHeader<'_>) -> Result<i64, OrderError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders \
             (order_number, customer_name, customer_email, customer_phone, address, note, \
              total_price, total_items, status, payment_status, order_source, product_type, \
              created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 COALESCE($9, 'pending'), COALESCE($10, 'unpaid'), COALESCE($11, 'website'), \
                 $12, $13, $13) \
         RETURNING id",
    )
    .bind(header.order_number)
    .bind(header.customer_name.trim())
    .bind(header.customer_email)
    .bind(header.customer_phone)
    .bind(header.address)
    .bind(header.note)
    .bind(header.total_price)
    .bind(header.total_items)
    .bind(&header.metadata.status)
    .bind(&header.metadata.payment_status)
    .bind(&header.metadata.order_source)
    .bind(header.kind.as_str())
    .bind(header.now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn decrement_stock(conn: &mut PgConnection, demand: &VariantDemand) -> Result<(), OrderError> {
    let requested = i32::try_from(demand.requested).map_err(|_| OrderError::InsufficientStock {
        product: demand.product_name.clone(),
        variant: demand.label.clone(),
        available: demand.available,
        requested: demand.requested,
    })?;

    let updated = sqlx::query_scalar::<_, i32>(
        "UPDATE product_variants \
         SET stock = stock - $2, updated_at = NOW() \
         WHERE id = $1 AND stock >= $2 \
         RETURNING stock",
    )
    .bind(demand.variant_id)
    .bind(requested)
    .fetch_optional(&mut *conn)
    .await?;

    if updated.is_some() {
        return Ok(());
    }

    let available = sqlx::query_scalar::<_, i32>("SELECT stock FROM product_variants WHERE id = $1")
        .bind(demand.variant_id)
        .fetch_optional(&mut *conn)
        .await?
        .unwrap_or(0);

    Err(OrderError::PlacementFailed {
        product: demand.product_name.clone(),
        variant: demand.label.clone(),
        available: i64::from(available),
        requested: demand.requested,
    })
}

async fn upsert_daily_sales(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
    revenue: Decimal,
    items: i64,
) -> Result<(), OrderError> {
    sqlx::query(
        "INSERT INTO daily_sales (sale_date, total_revenue, total_orders, total_items) \
         VALUES ($1, $2, 1, $3) \
         ON CONFLICT (sale_date) DO UPDATE SET \
             total_revenue = daily_sales.total_revenue + EXCLUDED.total_revenue, \
             total_orders  = daily_sales.total_orders + 1, \
             total_items   = daily_sales.total_items + EXCLUDED.total_items, \
             updated_at    = NOW()",
    )
    .bind(now.date_naive())
    .bind(revenue)
    .bind(items)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Listing and updates
// ---------------------------------------------------------------------------

const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
     address, note, total_price, total_items, status, payment_status, order_source, product_type, \
     consignment_id, tracking_code, courier_status, courier_last_checked, created_at, updated_at";

/// Orders of one kind, newest first, each with its items, plus the total
/// count matching the same filter.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_orders(
    pool: &PgPool,
    kind: OrderKind,
    status: Option<&str>,
    limit: Option<i64>,
    skip: Option<i64>,
) -> Result<OrderListing, DbError> {
    let limit = limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT);
    let skip = skip.unwrap_or(0).max(0);
    let status = status.map(str::trim).filter(|s| !s.is_empty());

    let orders = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE product_type = $1 AND ($2::text IS NULL OR status = $2) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $3 OFFSET $4"
    ))
    .bind(kind.as_str())
    .bind(status)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM orders \
         WHERE product_type = $1 AND ($2::text IS NULL OR status = $2)",
    )
    .bind(kind.as_str())
    .bind(status)
    .fetch_one(pool)
    .await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, combo_id, product_name, quantity, price, \
                purchase_price, design, color, size, sku \
         FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i64, Vec<OrderItemRow>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(OrderListing {
        orders: orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect(),
        total,
    })
}

/// Sets `status` and/or `payment_status`; `None` keeps the stored value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no order has `id`.
pub async fn update_order_status(
    pool: &PgPool,
    id: i64,
    status: Option<&str>,
    payment_status: Option<&str>,
) -> Result<OrderRow, DbError> {
    sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders SET \
             status         = COALESCE($2, status), \
             payment_status = COALESCE($3, payment_status), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(payment_status)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// Courier write-back
// ---------------------------------------------------------------------------

/// Records a created consignment on the order whose number is `invoice`.
///
/// Returns `false` when no order carries that number.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_sent_to_courier(
    pool: &PgPool,
    invoice: &str,
    consignment_id: &str,
    tracking_code: Option<&str>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE orders SET \
             consignment_id = $2, \
             tracking_code  = $3, \
             courier_status = 'sent_to_courier', \
             updated_at     = NOW() \
         WHERE order_number = $1",
    )
    .bind(invoice)
    .bind(consignment_id)
    .bind(tracking_code)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mirrors the courier's delivery status onto every order with this
/// consignment id. Returns the number of orders updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_courier_status(
    pool: &PgPool,
    consignment_id: &str,
    courier_status: &str,
    checked_at: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE orders SET \
             courier_status       = $2, \
             courier_last_checked = $3, \
             updated_at           = NOW() \
         WHERE consignment_id = $1",
    )
    .bind(consignment_id)
    .bind(courier_status)
    .bind(checked_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Consignment ids whose courier status is not yet final.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_courier_pending_orders(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT consignment_id FROM orders \
         WHERE consignment_id IS NOT NULL \
           AND (courier_status IS NULL OR NOT (lower(courier_status) = ANY($1))) \
         ORDER BY consignment_id",
    )
    .bind(FINAL_COURIER_STATUSES)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_ref: &str, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            product_ref: product_ref.to_string(),
            descriptor: VariantDescriptor::default(),
            quantity,
            price: Decimal::from(100),
        }
    }

    fn checkout(items: Vec<NewOrderLine>) -> OrderRequest {
        OrderRequest {
            mode: PlacementMode::Checkout,
            customer_name: Some("Rina".to_string()),
            customer_email: Some("rina@example.com".to_string()),
            customer_phone: None,
            address: None,
            note: None,
            items,
            metadata: OrderMetadata::default(),
        }
    }

    #[test]
    fn checkout_requires_email_but_not_address() {
        assert!(checkout(vec![line("1", 1)]).validate().is_ok());

        let mut request = checkout(vec![line("1", 1)]);
        request.customer_email = Some("   ".to_string());
        assert!(matches!(request.validate(), Err(OrderError::Validation(_))));
    }

    #[test]
    fn direct_order_requires_address_note_and_phone() {
        let mut request = checkout(vec![line("1", 1)]);
        request.mode = PlacementMode::Direct;
        assert!(request.validate().is_err());

        request.address = Some("House 1, Road 2".to_string());
        request.note = Some("Call first".to_string());
        request.customer_phone = Some("01712345678".to_string());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_items_fail_validation() {
        assert!(matches!(
            checkout(Vec::new()).validate(),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn core_minimum_maps_to_order_error_message() {
        let err = OrderError::from(CoreError::MinimumQuantity {
            minimum: 3,
            actual: 1,
        });
        assert_eq!(
            err.to_string(),
            "Minimum order quantity is 3 items. Currently: 1"
        );
    }

    #[test]
    fn insufficient_stock_message_names_counts() {
        let err = OrderError::InsufficientStock {
            product: "Dino Tee".to_string(),
            variant: "Red M".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Dino Tee - Red M. Available: 2, Requested: 5"
        );
    }

    #[test]
    fn order_kind_column_values() {
        assert_eq!(OrderKind::Product.as_str(), "product");
        assert_eq!(OrderKind::Combo.as_str(), "combo");
    }
}
