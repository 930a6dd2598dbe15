use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::CartItem;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// GET /cart - all rows for the authenticated email.
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = CartItem::find_by_email(&state.db, &user.email).await?;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// POST /cart - add a product, rejecting duplicates per (email, product).
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.quantity < 1 {
        return Err(ApiError::bad_request("quantity must be at least 1"));
    }

    if CartItem::exists(&state.db, &user.email, body.product_id).await? {
        return Err(ApiError::bad_request("Product already in cart"));
    }

    // The unique index still wins a lost race between the check and here.
    let inserted = CartItem::insert(&state.db, &user.email, body.product_id, body.quantity).await?;
    if inserted.is_none() {
        return Err(ApiError::bad_request("Product already in cart"));
    }

    let cart = CartItem::find_by_email(&state.db, &user.email).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "cart": cart })),
    ))
}

/// PATCH /cart/:id - set the quantity on one cart row.
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.quantity < 1 {
        return Err(ApiError::bad_request("quantity must be at least 1"));
    }

    let touched = CartItem::update_quantity(&state.db, id, &user.email, body.quantity).await?;
    if touched == 0 {
        return Err(ApiError::not_found("Cart item not found"));
    }

    let cart = CartItem::find_by_email(&state.db, &user.email).await?;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// DELETE /cart/:id - remove one cart row by its id.
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = CartItem::delete(&state.db, id, &user.email).await?;
    if removed == 0 {
        return Err(ApiError::not_found("Cart item not found"));
    }

    let cart = CartItem::find_by_email(&state.db, &user.email).await?;
    Ok(Json(json!({ "success": true, "cart": cart })))
}
