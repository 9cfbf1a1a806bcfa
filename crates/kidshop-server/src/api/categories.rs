use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kidshop_core::{build_category_tree, flatten_with_paths, Category, CategoryNode, FlatCategory};
use serde::{Deserialize, Deserializer};

use crate::middleware::RequestId;

use super::{map_db_error, map_lookup_error, parse_id, ApiError, ApiResponse, AppState, Deleted};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCategoryBody {
    #[serde(default)]
    name: String,
    slug: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    parent_id: Option<i64>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    sort_order: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateCategoryBody {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    image: Option<String>,
    /// Absent keeps the parent, `null` moves the category to the root.
    #[serde(default, deserialize_with = "present_or_null")]
    parent_id: Option<Option<i64>>,
    is_active: Option<bool>,
    sort_order: Option<i32>,
}

fn default_active() -> bool {
    true
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

async fn load_all(state: &AppState, req_id: &str, active_only: bool) -> Result<Vec<Category>, ApiError> {
    let rows = if active_only {
        kidshop_db::list_active_categories(&state.pool).await
    } else {
        kidshop_db::list_categories(&state.pool).await
    }
    .map_err(|e| map_db_error(req_id.to_string(), &e))?;
    Ok(rows.into_iter().map(Category::from).collect())
}

/// GET /api/categories: every category as a parent/child tree.
pub(super) async fn category_tree(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CategoryNode>>>, ApiError> {
    let categories = load_all(&state, &req_id.0, false).await?;
    let tree = build_category_tree(categories).map_err(|e| {
        tracing::error!(error = %e, "stored category hierarchy is cyclic");
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;
    Ok(ApiResponse::json(req_id.0, tree))
}

/// GET /api/categories/flat: active categories with their `A > B` path.
pub(super) async fn flat_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<FlatCategory>>>, ApiError> {
    let categories = load_all(&state, &req_id.0, true).await?;
    let flat = flatten_with_paths(categories).map_err(|e| {
        tracing::error!(error = %e, "stored category hierarchy is cyclic");
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;
    Ok(ApiResponse::json(req_id.0, flat))
}

pub(super) async fn create_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCategoryBody>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "Category name is required",
        ));
    }

    let new = kidshop_db::NewCategory {
        name: body.name,
        slug: body.slug,
        description: body.description,
        image: body.image,
        parent_id: body.parent_id,
        is_active: body.is_active,
        sort_order: body.sort_order,
    };
    let row = kidshop_db::create_category(&state.pool, &new)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(category_id = row.id, slug = %row.slug, "category created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::json(req_id.0, Category::from(row)),
    ))
}

pub(super) async fn update_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryBody>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let id = parse_id(&req_id.0, &id, "category")?;
    if body.parent_id == Some(Some(id)) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "A category cannot be its own parent",
        ));
    }

    let update = kidshop_db::UpdateCategory {
        name: body.name,
        slug: body.slug,
        description: body.description,
        image: body.image,
        parent_id: body.parent_id,
        is_active: body.is_active,
        sort_order: body.sort_order,
    };
    let row = kidshop_db::update_category(&state.pool, id, &update)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Category"))?;

    Ok(ApiResponse::json(req_id.0, Category::from(row)))
}

pub(super) async fn delete_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let id = parse_id(&req_id.0, &id, "category")?;
    kidshop_db::delete_category(&state.pool, id)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e, "Category"))?;
    tracing::info!(category_id = id, "category deleted");

    Ok(ApiResponse::json(req_id.0, Deleted::new("Category deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_distinguishes_absent_from_null() {
        let absent: UpdateCategoryBody =
            serde_json::from_str(r#"{"name":"Boys"}"#).expect("absent");
        assert_eq!(absent.parent_id, None);

        let null: UpdateCategoryBody =
            serde_json::from_str(r#"{"parentId":null}"#).expect("null");
        assert_eq!(null.parent_id, Some(None));

        let set: UpdateCategoryBody = serde_json::from_str(r#"{"parentId":4}"#).expect("set");
        assert_eq!(set.parent_id, Some(Some(4)));
    }

    #[test]
    fn create_body_defaults_to_active() {
        let body: CreateCategoryBody = serde_json::from_str(r#"{"name":"Girls"}"#).expect("body");
        assert!(body.is_active);
        assert_eq!(body.sort_order, 0);
        assert!(body.slug.is_none());
    }
}
