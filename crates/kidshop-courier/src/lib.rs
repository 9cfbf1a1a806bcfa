//! Steadfast (packzy) courier integration: credential resolution, order
//! preparation, and the HTTP client.

pub mod client;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::SteadfastClient;
pub use credentials::{resolve_credentials, SteadfastCredentials};
pub use error::CourierError;
pub use normalize::{normalize_phone, prepare_orders};
pub use types::{
    CourierOrderInput, CreateOutcome, CreatedConsignment, StatusOutcome, SteadfastOrder,
};
