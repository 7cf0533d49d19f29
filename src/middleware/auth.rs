//! Session extraction
//!
//! The session token is read from `Authorization: Bearer <token>` or, for
//! browser clients, from the session cookie.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    constants::SESSION_COOKIE_NAME, error::AppError, models::UserRole, services::AuthService,
    state::AppState,
};

/// User behind a valid session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = AuthService::verify_token(token, &state.config().session)?;

        let id = Uuid::parse_str(&claims.sub).map_err(|e| {
            debug!(sub = %claims.sub, error = ?e, "Invalid user ID in token");
            AppError::InvalidToken
        })?;

        Ok(Self {
            id,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            debug!(path = %parts.uri.path(), "No session token");
            return Err(AppError::Unauthorized);
        };

        Self::from_token(token, state).inspect_err(|e| {
            debug!(path = %parts.uri.path(), error = %e, "Session token rejected");
        })
    }
}

/// Bearer token first, then the session cookie
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE_NAME)
            .map(|(_, value)| value)
            .filter(|v| !v.is_empty())
    })
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE_NAME, token, max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn cleared_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}
