pub mod app_config;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod orders;
pub mod settings;
pub mod stats;

use thiserror::Error;

pub use app_config::{AppConfig, CloudinaryConfig, Environment};
pub use catalog::{slug_from_name, VariantDescriptor, VariantFields, LOW_STOCK_THRESHOLD};
pub use categories::{
    build_category_tree, ensure_parent_allowed, flatten_with_paths, Category, CategoryNode,
    FlatCategory,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use orders::{
    generate_order_number, max_money, round_price, summarize_lines, validate_checkout_quantity,
    OrderLine, OrderTotals, MAX_LINE_QUANTITY, MINIMUM_CHECKOUT_QUANTITY,
};
pub use settings::{
    CourierProvider, CourierSettings, GeneralSettings, GeneralSettingsUpdate,
    STEADFAST_DEFAULT_BASE_URL,
};
pub use stats::{DateRange, StatsFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Domain rule violations raised by the pure logic in this crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Minimum order quantity is {minimum} items. Currently: {actual}")]
    MinimumQuantity { minimum: i64, actual: i64 },

    #[error("category hierarchy contains a cycle through category {0}")]
    CycleDetected(i64),

    #[error("invalid month {0}; expected 1-12")]
    InvalidMonth(u32),
}
