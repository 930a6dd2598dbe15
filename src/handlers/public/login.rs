use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - verify credentials and issue the token pair.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.trim().to_ascii_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !bcrypt::verify(&body.password, &user.password)? {
        tracing::warn!("failed login attempt for {}", user.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let tokens = auth::issue_token_pair(&user, &state.config.auth)?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
    })))
}
