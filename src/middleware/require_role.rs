use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

use super::auth::AuthUser;

/// The caller's user record as currently stored, re-fetched per request.
/// Role checks run against this record, never against token claims.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Requires a stored role of `admin`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(state, request, next, Some("admin")).await
}

/// Requires a stored role of `user`.
pub async fn require_user(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(state, request, next, Some("user")).await
}

/// Loads the current user without imposing a role, for routes that branch
/// on role inside the handler (e.g. order listing).
pub async fn attach_current_user(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(state, request, next, None).await
}

async fn guard(
    state: AppState,
    mut request: Request,
    next: Next,
    required_role: Option<&str>,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Token verification required before role check"))?;

    let user = User::find_by_email(&state.db, &auth_user.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("role check failed: no stored user for {}", auth_user.email);
            ApiError::forbidden("Forbidden access")
        })?;

    if let Some(required) = required_role {
        if user.role != required {
            tracing::warn!(
                "role check failed: {} has role '{}', route requires '{}'",
                user.email,
                user.role,
                required
            );
            return Err(ApiError::forbidden("Forbidden access"));
        }
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
