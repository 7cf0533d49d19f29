//! Profile handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::auth::UserResponse,
    middleware::auth::AuthenticatedUser,
    services::{require, Action, UserService},
    state::AppState,
};

use super::request::UpdateProfileRequest;

/// Update the session user's name and email
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    require(&auth_user, Action::UpdateProfile { user_id: auth_user.id })?;
    payload.validate()?;

    let user =
        UserService::update_profile(state.db(), &auth_user.id, &payload.name, &payload.email)
            .await?;

    Ok(Json(user.into()))
}
