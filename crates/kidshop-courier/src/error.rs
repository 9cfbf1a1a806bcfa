use thiserror::Error;

/// Errors returned by the Steadfast courier client.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Network or TLS failure, or a non-2xx status from the courier.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Neither the courier providers nor the general settings hold a key pair.
    #[error("Steadfast API credentials not configured")]
    MissingCredentials,

    #[error("Orders array required")]
    EmptyBatch,

    /// An order failed local validation; nothing was sent.
    #[error("Invalid order data for invoice {0}")]
    InvalidOrder(String),

    /// The base URL could not be parsed.
    #[error("Steadfast API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
