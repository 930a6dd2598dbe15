use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::product::{NewProduct, ProductPatch};
use crate::database::models::Product;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /products - create a product. Admin-gated at the route layer.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if body.price.is_sign_negative() || body.sale_price.is_sign_negative() {
        return Err(ApiError::bad_request("prices must not be negative"));
    }

    let product = Product::insert(&state.db, body).await?;

    tracing::info!("created product {} in collection {}", product.id, product.collection);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    ))
}

/// PATCH /products/:id - partial update; extra fields merge into the
/// product's open-ended attributes.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductPatch>,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("no fields to update"));
    }
    if body.price.map_or(false, |p| p.is_sign_negative())
        || body.sale_price.map_or(false, |p| p.is_sign_negative())
    {
        return Err(ApiError::bad_request("prices must not be negative"));
    }

    let product = Product::update(&state.db, id, body)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// DELETE /products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = crate::database::Repository::<Product>::new("products", state.db.clone());
    let removed = repo.delete_by_id(id).await?;
    if removed == 0 {
        return Err(ApiError::not_found("Product not found"));
    }

    Ok(Json(json!({ "success": true })))
}
