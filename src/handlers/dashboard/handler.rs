//! Dashboard handler implementations

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    db::repositories::DashboardCounts,
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::Activity,
    services::{require, Action, DashboardService},
    state::AppState,
};

use super::request::ActivityQuery;

/// Dashboard counters for the session user
pub async fn get_stats(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<DashboardCounts>> {
    require(&auth_user, Action::ViewDashboard)?;

    let counts = DashboardService::stats(state.db(), &auth_user).await?;
    Ok(Json(counts))
}

/// Recent activity, newest first
pub async fn get_activity(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<Activity>>> {
    require(&auth_user, Action::ViewDashboard)?;

    let activity = DashboardService::recent_activity(state.db(), &auth_user, query.limit).await?;
    Ok(Json(activity))
}
