use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

// Path relative to crates/kidshop-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &kidshop_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Core(#[from] kidshop_core::CoreError),
}

impl DbError {
    /// Whether this error is a Postgres unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlx(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505")
        )
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; count that as zero.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}


pub mod cart;
pub mod categories;
pub mod combos;
pub mod menus;
pub mod orders;
pub mod products;
pub mod settings;
pub mod sliders;
pub mod stats;

pub use cart::{check_cart, CartItemReport, CartLine, CartReport};
pub use categories::{
    create_category, delete_category, get_category, list_active_categories, list_categories,
    update_category, CategoryRow, NewCategory, UpdateCategory,
};
pub use combos::{
    create_combo, delete_combo, get_combo, list_combos, update_combo, ComboRow, ComboWrite,
};
pub use menus::{create_menu, delete_menu, list_menus, update_menu, MenuRow, MenuWrite};
pub use orders::{
    list_courier_pending_orders, list_orders, mark_courier_status, mark_sent_to_courier,
    place_combo_order, place_order, update_order_status, ComboOrderLine, ComboOrderRequest,
    NewOrderLine, OrderError, OrderItemRow, OrderKind, OrderListing, OrderMetadata, OrderRequest,
    OrderRow, OrderWithItems, PlacedOrder, PlacementMode,
};
pub use products::{
    create_product, get_product, list_products, list_stock, load_products_with_variants,
    NewProduct, NewVariant, ProductFilter, ProductRow, ProductWithVariants, StockRow, VariantRow,
    VariantStock,
};
pub use settings::{
    get_courier_settings, get_general_settings, save_courier_settings, save_general_settings,
};
pub use sliders::{create_slider, list_sliders, Slide, SliderRow, SliderWrite};
pub use stats::{dashboard_stats, DashboardStats, DistributionEntry};
