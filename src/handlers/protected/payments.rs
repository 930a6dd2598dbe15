use axum::{extract::State, response::IntoResponse, Extension, Json};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Order, Product};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
}

/// One priceable order line, pulled out of the stored payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineItem {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// POST /payments/intent - create a payment intent for an order.
///
/// The charge amount is recomputed here from the order's line items and
/// current sale prices; nothing the client sent in the order payload can
/// influence what gets charged.
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateIntentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = Order::find_by_id(&state.db, body.order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    if !user.is_admin() && order.user_email != user.email {
        return Err(ApiError::forbidden("Forbidden access"));
    }

    let items = line_items(&order.payload);
    if items.is_empty() {
        return Err(ApiError::bad_request("Order has no priceable items"));
    }

    let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let repo = Repository::<Product>::new("products", state.db.clone());
    let products = repo.select_ids(&ids).await?;

    let amount = amount_cents(&items, &products)?;

    let intent = state
        .payments
        .create_intent(amount, &state.config.payment.currency)
        .await?;

    tracing::info!("payment intent {} for order {} ({} cents)", intent.id, order.id, amount);

    Ok(Json(json!({ "success": true, "clientSecret": intent.client_secret })))
}

/// Extracts `{productId, quantity}` pairs from `payload.items`, dropping
/// entries that are not priceable (missing id, non-positive quantity).
/// A missing quantity counts as 1.
pub(crate) fn line_items(payload: &Value) -> Vec<LineItem> {
    let Some(items) = payload.get("items").and_then(Value::as_array) else {
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| {
            let product_id = item
                .get("productId")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())?;
            let quantity = match item.get("quantity") {
                None => 1,
                Some(q) => q.as_i64()?,
            };
            (quantity > 0).then_some(LineItem { product_id, quantity })
        })
        .collect()
}

/// Re-prices line items against current products and converts the total to
/// integer minor-currency units. Every item must resolve to a stored
/// product; an order referencing unknown products is not chargeable.
pub(crate) fn amount_cents(items: &[LineItem], products: &[Product]) -> Result<i64, ApiError> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut total = Decimal::ZERO;
    for item in items {
        let product = by_id
            .get(&item.product_id)
            .ok_or_else(|| ApiError::bad_request("Order references unknown products"))?;
        total += product.sale_price * Decimal::from(item.quantity);
    }

    let cents = (total * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| ApiError::bad_request("Order total out of range"))?;

    if cents <= 0 {
        return Err(ApiError::bad_request("Order total must be positive"));
    }
    Ok(cents)
}
