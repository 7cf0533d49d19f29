//! Authentication handler implementations

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::{cleared_session_cookie, session_cookie, AuthenticatedUser},
    models::UserRole,
    services::AuthService,
    state::AppState,
};

use super::{
    request::{LoginRequest, RegisterRequest},
    response::{AuthResponse, CurrentUserResponse, LogoutResponse, RegisterResponse},
};

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    payload.validate()?;

    let user = AuthService::register(
        state.db(),
        &payload.name,
        &payload.email,
        &payload.password,
        payload.role.unwrap_or(UserRole::Competitor),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Login with email and password; also sets the session cookie
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let (user, token, expires_in) = AuthService::login(
        state.db(),
        &state.config().session,
        &payload.email,
        &payload.password,
    )
    .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = session_cookie(&token, expires_in);
    let body = AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in,
        user: user.into(),
    };

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(body)))
}

/// Logout: drop the session cookie
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, cleared_session_cookie())]),
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<CurrentUserResponse>> {
    let user = AuthService::get_user_by_id(state.db(), &auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(CurrentUserResponse { user: user.into() }))
}
