#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudinary rejected the upload (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to deserialize response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid upload URL: {0}")]
    InvalidUrl(String),
}
