use std::time::Duration;

use kidshop_core::CloudinaryConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::MediaError;

pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Signed-upload client for one Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
    base_url: String,
}

impl CloudinaryClient {
    /// # Errors
    ///
    /// Returns [`MediaError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: CloudinaryConfig, timeout_secs: u64) -> Result<Self, MediaError> {
        Self::with_base_url(config, timeout_secs, CLOUDINARY_API_BASE)
    }

    /// Creates a client against a custom API root. Used by tests to point
    /// at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        config: CloudinaryConfig,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kidshop/0.1 (media)")
            .build()?;
        Ok(Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Uploads an image into `folder` and returns its `secure_url`.
    ///
    /// A `None` buffer yields `Ok(None)` without any network call, so
    /// optional form files can be passed straight through.
    ///
    /// # Errors
    ///
    /// - [`MediaError::Http`] on network failure.
    /// - [`MediaError::Rejected`] if Cloudinary answers with a non-2xx status.
    /// - [`MediaError::Deserialize`] if a 2xx body lacks `secure_url`.
    pub async fn upload(
        &self,
        buffer: Option<Vec<u8>>,
        folder: &str,
    ) -> Result<Option<String>, MediaError> {
        let Some(bytes) = buffer else {
            return Ok(None);
        };
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.upload_signed(bytes, folder, &timestamp).await.map(Some)
    }

    async fn upload_signed(
        &self,
        bytes: Vec<u8>,
        folder: &str,
        timestamp: &str,
    ) -> Result<String, MediaError> {
        let url = self.upload_url()?;
        let size = bytes.len();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", timestamp)],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name("upload"))
            .text("api_key", self.config.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(url.clone()).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map_or_else(|_| body.clone(), |e| e.error.message);
            tracing::warn!(status = status.as_u16(), %message, "cloudinary upload rejected");
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| MediaError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        tracing::info!(folder, size, url = %parsed.secure_url, "image uploaded");
        Ok(parsed.secure_url)
    }

    fn upload_url(&self) -> Result<Url, MediaError> {
        let raw = format!("{}/{}/image/upload", self.base_url, self.config.cloud_name);
        Url::parse(&raw).map_err(|e| MediaError::InvalidUrl(format!("{raw}: {e}")))
    }
}

/// Computes a Cloudinary request signature: parameters sorted by name,
/// joined as `k=v` pairs with `&`, suffixed with the API secret and hashed
/// with SHA-256.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}
