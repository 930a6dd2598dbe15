use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::{json, Value};

use crate::database::models::Order;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Top-level keys owned by the server; stripped from incoming payloads so
/// the stored document cannot shadow them.
const RESERVED_KEYS: &[&str] = &["id", "user_email", "created_at"];

/// POST /orders - store the client's order document verbatim, stamped with
/// the authenticated email. Line items are not validated here; checkout
/// re-prices them server-side (see payments::create_intent).
pub async fn create_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut payload = match body {
        Value::Object(map) => map,
        _ => return Err(ApiError::bad_request("order payload must be an object")),
    };
    for key in RESERVED_KEYS {
        payload.remove(*key);
    }

    let order = Order::insert(&state.db, &user.email, Value::Object(payload)).await?;

    tracing::info!("created order {} for {}", order.id, order.user_email);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": order })),
    ))
}

/// GET /orders - admins see every order, everyone else only their own.
/// The branch runs on the stored role attached by the middleware, not on
/// token claims.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = if user.is_admin() {
        Order::list_all(&state.db).await?
    } else {
        Order::list_for_email(&state.db, &user.email).await?
    };

    Ok(Json(json!({ "success": true, "orders": orders })))
}
