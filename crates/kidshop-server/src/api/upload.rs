use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::form::{upload_optional, FormData};
use super::{ApiError, ApiResponse, AppState};

const DEFAULT_FOLDER: &str = "general";

#[derive(Debug, Serialize)]
pub(super) struct Uploaded {
    url: String,
}

/// POST /api/upload: one `file` part, stored under `folder`.
pub(super) async fn upload_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Uploaded>>, ApiError> {
    let rid = req_id.0.as_str();
    let mut form = FormData::read(rid, multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::new(rid, "validation_error", "No file uploaded"))?;
    let folder = form.text("folder").unwrap_or(DEFAULT_FOLDER).to_string();

    let url = upload_optional(rid, state.media.as_ref(), Some(file), &folder)
        .await?
        .ok_or_else(|| ApiError::new(rid, "upstream_error", "Image upload returned no URL"))?;
    tracing::info!(folder = %folder, "image uploaded");

    Ok(ApiResponse::json(req_id.0, Uploaded { url }))
}
