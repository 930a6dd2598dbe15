use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, TokenKind};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// POST /auth/refresh - exchange a refresh token for a new access token.
///
/// The user is re-read so a deleted account cannot keep minting access
/// tokens for the remainder of the refresh window.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = auth::verify_token(&body.refresh_token, TokenKind::Refresh, &state.config.auth)?;

    let user = User::find_by_email(&state.db, &claims.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let access_token = auth::issue_token(&user, TokenKind::Access, &state.config.auth)?;

    Ok(Json(json!({
        "success": true,
        "accessToken": access_token,
    })))
}
