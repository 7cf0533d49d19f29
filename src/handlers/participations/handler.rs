//! Participation handler implementations

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    db::repositories::ParticipationFilter,
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::Participation,
    services::{require, Action, ParticipationService},
    state::AppState,
};

use super::{
    request::{ListParticipationsQuery, RequestParticipationRequest},
    response::ParticipationResponse,
};

/// Ask to join a competition (competitors only)
pub async fn request_participation(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<RequestParticipationRequest>,
) -> AppResult<(StatusCode, Json<Participation>)> {
    require(&auth_user, Action::RequestParticipation)?;

    let participation =
        ParticipationService::request(state.db(), &auth_user, &payload.competition_id).await?;

    Ok((StatusCode::CREATED, Json(participation)))
}

/// List participations
pub async fn list_participations(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListParticipationsQuery>,
) -> AppResult<Json<Vec<ParticipationResponse>>> {
    require(&auth_user, Action::ListParticipations)?;

    let filter = ParticipationFilter {
        competition_id: query.competition_id,
        user_id: query.user_id,
    };
    let rows = ParticipationService::list(state.db(), &filter).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
