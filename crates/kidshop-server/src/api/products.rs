use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::form::{upload_optional, FormData};
use super::{
    map_db_error, map_lookup_error, parse_id, parse_id_list, ApiError, ApiResponse, AppState,
};

const MAX_GALLERY_IMAGES: usize = 10;

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub featured: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VariantInput {
    design: String,
    color: String,
    size: String,
    sku: Option<String>,
    stock: i32,
    price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedProduct {
    id: i64,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<kidshop_db::ProductWithVariants>>>, ApiError> {
    let category_id = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| parse_id(&req_id.0, c, "category"))
        .transpose()?;

    let filter = kidshop_db::ProductFilter {
        category_id,
        search: query.search,
        featured_only: query.featured.as_deref() == Some("true"),
        limit: query.limit,
    };
    let products = kidshop_db::list_products(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::json(req_id.0, products))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<kidshop_db::ProductWithVariants>>, ApiError> {
    let id = parse_id(&req_id.0, &id, "product")?;
    let product = kidshop_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Product"))?;
    Ok(ApiResponse::json(req_id.0, product))
}

/// POST /api/products: multipart product with images and variants.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CreatedProduct>>), ApiError> {
    let rid = req_id.0.as_str();
    let mut form = FormData::read(rid, multipart).await?;

    let name = form
        .text("name")
        .ok_or_else(|| ApiError::new(rid, "validation_error", "Product name is required"))?
        .to_string();
    let raw_categories: Vec<serde_json::Value> = form.json(rid, "categories")?;
    let category_ids = parse_id_list(rid, &raw_categories, "category")?;
    if category_ids.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "At least one category is required",
        ));
    }
    let price = form
        .decimal(rid, "price")?
        .ok_or_else(|| ApiError::new(rid, "validation_error", "price must be a number"))?;
    let offer_price = form.decimal(rid, "offerPrice")?;
    let purchase_price = form.decimal(rid, "purchasePrice")?;

    let variants: Vec<VariantInput> = form.json(rid, "variants")?;
    if variants.iter().any(|v| v.stock < 0) {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Variant stock cannot be negative",
        ));
    }

    let featured = form.take_file("featuredImage").ok_or_else(|| {
        ApiError::new(rid, "validation_error", "Featured image is required")
    })?;
    let gallery = form.take_files("images");
    if gallery.len() > MAX_GALLERY_IMAGES {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("At most {MAX_GALLERY_IMAGES} gallery images are allowed"),
        ));
    }

    let media = state.media.as_ref();
    let image = upload_optional(rid, media, Some(featured), "products/featured")
        .await?
        .unwrap_or_default();
    let mut images = Vec::with_capacity(gallery.len());
    for buffer in gallery {
        if let Some(url) = upload_optional(rid, media, Some(buffer), "products/gallery").await? {
            images.push(url);
        }
    }

    let product = kidshop_db::NewProduct {
        name,
        description: form.text_or_empty("description"),
        category_ids,
        price,
        offer_price,
        purchase_price,
        design_name: form.text("designName").map(ToOwned::to_owned),
        image,
        images,
        is_active: form.flag("isActive", true),
        is_featured: form.flag("isFeatured", false),
        variants: variants
            .into_iter()
            .map(|v| kidshop_db::NewVariant {
                design: v.design.trim().to_string(),
                color: v.color.trim().to_string(),
                size: v.size.trim().to_string(),
                sku: v.sku.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                stock: v.stock,
                price: v.price,
            })
            .collect(),
    };

    let id = kidshop_db::create_product(&state.pool, &product)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(product_id = id, "product created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::json(req_id.0, CreatedProduct { id }),
    ))
}

/// GET /api/stock: per-variant stock for every product.
pub(super) async fn list_stock(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<kidshop_db::StockRow>>>, ApiError> {
    let rows = kidshop_db::list_stock(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::json(req_id.0, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_input_defaults_missing_fields() {
        let v: VariantInput =
            serde_json::from_str(r#"{"color":"Red","size":"2Y","stock":5}"#).expect("variant");
        assert_eq!(v.design, "");
        assert_eq!(v.stock, 5);
        assert!(v.sku.is_none());
    }
}
