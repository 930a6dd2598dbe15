use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// POST /auth/register - create a user account.
///
/// The role is accepted from the request body ("admin" or "user",
/// defaulting to "user"); there is no promotion endpoint, so admin
/// accounts are created this way. No token is issued; the caller logs in
/// separately.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    let email = body.email.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    validate_email(&email)?;
    if body.password.len() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }

    let role = match body.role.as_deref() {
        None | Some("user") => "user",
        Some("admin") => "admin",
        Some(other) => {
            return Err(ApiError::bad_request(format!("unknown role: {}", other)));
        }
    };

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let hash = bcrypt::hash(&body.password, state.config.auth.bcrypt_cost)?;
    let user = User::insert(&state.db, name, &email, &hash, role).await?;

    tracing::info!("registered user {} ({})", user.email, user.role);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user })),
    ))
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let parts: Vec<&str> = email.split('@').collect();
    let valid = parts.len() == 2
        && !parts[0].is_empty()
        && parts[1].contains('.')
        && !parts[1].starts_with('.')
        && !parts[1].ends_with('.');
    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("invalid email format"))
    }
}
