use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use kidshop_db::{ComboRow, ComboWrite};

use crate::middleware::RequestId;

use super::form::{upload_optional, FormData};
use super::{
    map_db_error, map_lookup_error, parse_id, parse_id_list, ApiError, ApiResponse, AppState,
    Deleted,
};

const FEATURED_FOLDER: &str = "combos/featured";

pub(super) async fn list_combos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ComboRow>>>, ApiError> {
    let combos = kidshop_db::list_combos(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, combos))
}

pub(super) async fn get_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ComboRow>>, ApiError> {
    let id = parse_id(&req_id.0, &id, "combo")?;
    let combo = kidshop_db::get_combo(&state.pool, id)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Combo"))?;
    Ok(ApiResponse::json(req_id.0, combo))
}

/// Reads the shared create/update form. `featured_image` is the stored URL
/// to fall back on when no new file is sent.
async fn combo_from_form(
    state: &AppState,
    req_id: &str,
    mut form: FormData,
    featured_image: Option<String>,
) -> Result<ComboWrite, ApiError> {
    let title = form
        .text("title")
        .ok_or_else(|| ApiError::new(req_id, "validation_error", "Combo title is required"))?
        .to_string();

    let raw_products: Vec<serde_json::Value> = form.json(req_id, "products")?;
    let product_ids = parse_id_list(req_id, &raw_products, "product")?;
    if product_ids.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "At least one product is required",
        ));
    }

    let raw_sizes: Vec<String> = form.json(req_id, "sizes")?;
    let sizes: Vec<String> = raw_sizes
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sizes.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "At least one size is required",
        ));
    }

    let price = form.decimal(req_id, "price")?.unwrap_or_default();
    let offer_price = form.decimal(req_id, "offerPrice")?;

    let uploaded = upload_optional(
        req_id,
        state.media.as_ref(),
        form.take_file("featuredImage"),
        FEATURED_FOLDER,
    )
    .await?;

    Ok(ComboWrite {
        title,
        description: form.text_or_empty("description"),
        price,
        offer_price,
        sizes,
        product_ids,
        featured_image: uploaded.or(featured_image),
    })
}

pub(super) async fn create_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ComboRow>>), ApiError> {
    let rid = req_id.0.as_str();
    let form = FormData::read(rid, multipart).await?;
    let combo = combo_from_form(&state, rid, form, None).await?;

    let row = kidshop_db::create_combo(&state.pool, &combo)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(combo_id = row.id, products = row.product_ids.len(), "combo created");

    Ok((StatusCode::CREATED, ApiResponse::json(req_id.0, row)))
}

pub(super) async fn update_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ComboRow>>, ApiError> {
    let rid = req_id.0.as_str();
    let id = parse_id(rid, &id, "combo")?;
    let form = FormData::read(rid, multipart).await?;
    let existing = form.text("existingFeaturedImage").map(ToOwned::to_owned);
    let combo = combo_from_form(&state, rid, form, existing).await?;

    let row = kidshop_db::update_combo(&state.pool, id, &combo)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Combo"))?;

    Ok(ApiResponse::json(req_id.0, row))
}

pub(super) async fn delete_combo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = parse_id(&req_id.0, &id, "combo")?;
    kidshop_db::delete_combo(&state.pool, id)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Combo"))?;
    tracing::info!(combo_id = id, "combo deleted");

    Ok(ApiResponse::json(req_id.0, Deleted::new("Combo deleted successfully")))
}
