use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::models::User;

/// Token payload. Deliberately minimal: an opaque user id, the email used
/// for lookups, and the role hint. Authorization decisions always re-read
/// the role from the database (see middleware::require_role).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token secret not configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

fn secret_for(kind: TokenKind, config: &AuthConfig) -> Result<&str, AuthError> {
    let secret = match kind {
        TokenKind::Access => &config.access_secret,
        TokenKind::Refresh => &config.refresh_secret,
    };
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    Ok(secret)
}

fn expiry_for(kind: TokenKind, config: &AuthConfig) -> i64 {
    match kind {
        TokenKind::Access => config.access_expiry_secs,
        TokenKind::Refresh => config.refresh_expiry_secs,
    }
}

pub fn issue_token(user: &User, kind: TokenKind, config: &AuthConfig) -> Result<String, AuthError> {
    let secret = secret_for(kind, config)?;
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        exp: (now + Duration::seconds(expiry_for(kind, config))).timestamp(),
        iat: now.timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn issue_token_pair(user: &User, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: issue_token(user, TokenKind::Access, config)?,
        refresh_token: issue_token(user, TokenKind::Refresh, config)?,
    })
}

pub fn verify_token(token: &str, kind: TokenKind, config: &AuthConfig) -> Result<Claims, AuthError> {
    let secret = secret_for(kind, config)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}
