//! Buffered multipart forms for the admin upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;
use kidshop_media::CloudinaryClient;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use super::ApiError;

/// A multipart body split into text fields and file parts.
#[derive(Debug, Default)]
pub(super) struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<Vec<u8>>>,
}

impl FormData {
    /// Reads every part. Parts with a filename are files; empty files are
    /// dropped so an untouched file input counts as absent.
    pub(super) async fn read(req_id: &str, mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::new(req_id, "bad_request", format!("Invalid multipart request: {e}"))
        })? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            let is_file = field.file_name().is_some();
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::new(req_id, "bad_request", format!("Multipart error: {e}"))
            })?;
            if is_file {
                if !bytes.is_empty() {
                    form.files.entry(name).or_default().push(bytes.to_vec());
                }
            } else {
                form.fields
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
        Ok(form)
    }

    /// Trimmed, non-empty text value.
    pub(super) fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub(super) fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// Only `"true"` is true; an absent field yields `default`.
    pub(super) fn flag(&self, name: &str, default: bool) -> bool {
        self.text(name).map_or(default, |v| v == "true")
    }

    pub(super) fn decimal(&self, req_id: &str, name: &str) -> Result<Option<Decimal>, ApiError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<Decimal>().map_err(|_| {
                    ApiError::new(req_id, "validation_error", format!("{name} must be a number"))
                })
            })
            .transpose()
    }

    /// A field holding a JSON document; absent means `T::default()`.
    pub(super) fn json<T: DeserializeOwned + Default>(
        &self,
        req_id: &str,
        name: &str,
    ) -> Result<T, ApiError> {
        self.text(name).map_or_else(
            || Ok(T::default()),
            |raw| {
                serde_json::from_str(raw).map_err(|e| {
                    ApiError::new(req_id, "validation_error", format!("{name} is not valid JSON: {e}"))
                })
            },
        )
    }

    pub(super) fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files
            .get_mut(name)
            .and_then(|parts| (!parts.is_empty()).then(|| parts.remove(0)))
    }

    pub(super) fn take_files(&mut self, name: &str) -> Vec<Vec<u8>> {
        self.files.remove(name).unwrap_or_default()
    }
}

/// Uploads one optional buffer, mapping host failures to `upstream_error`.
pub(super) async fn upload_optional(
    req_id: &str,
    media: Option<&CloudinaryClient>,
    buffer: Option<Vec<u8>>,
    folder: &str,
) -> Result<Option<String>, ApiError> {
    if buffer.is_none() {
        return Ok(None);
    }
    let client = media.ok_or_else(|| {
        ApiError::new(req_id, "upstream_error", "Image hosting is not configured")
    })?;
    client.upload(buffer, folder).await.map_err(|e| {
        tracing::error!(error = %e, folder, "image upload failed");
        ApiError::new(req_id, "upstream_error", format!("Image upload failed: {e}"))
    })
}
