use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Product;
use crate::database::Repository;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /wishlist - resolve client-held wishlist ids to product documents.
///
/// Wishlist membership lives on the client; nothing is persisted here.
pub async fn resolve_wishlist(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = parse_ids(&body)?;

    let repo = Repository::<Product>::new("products", state.db.clone());
    let products = repo.select_ids(&ids).await?;

    Ok(Json(json!({ "success": true, "products": products })))
}

pub(crate) fn parse_ids(body: &Value) -> Result<Vec<Uuid>, ApiError> {
    let list = body
        .get("ids")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::bad_request("ids must be a list"))?;

    list.iter()
        .map(|v| {
            v.as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| ApiError::bad_request("ids must contain product ids"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_id_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = parse_ids(&json!({ "ids": [a.to_string(), b.to_string()] })).unwrap();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn empty_list_is_allowed() {
        assert!(parse_ids(&json!({ "ids": [] })).unwrap().is_empty());
    }

    #[test]
    fn missing_ids_is_rejected() {
        assert!(parse_ids(&json!({})).is_err());
    }

    #[test]
    fn non_list_ids_is_rejected() {
        assert!(parse_ids(&json!({ "ids": "abc" })).is_err());
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!(parse_ids(&json!({ "ids": ["not-a-uuid"] })).is_err());
    }
}
