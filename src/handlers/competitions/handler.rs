//! Competition handler implementations

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    constants::{IMPORT_FILE_FIELD, TOTAL_COUNT_HEADER},
    error::{AppError, AppResult},
    import::ImportReport,
    middleware::auth::AuthenticatedUser,
    models::{Competition, CompetitionStatus, Coordinates},
    services::{
        competition_service::{DateWindow, ListCriteria},
        require, Action, CompetitionService,
    },
    state::AppState,
};

use super::{
    request::{CreateCompetitionRequest, ListCompetitionsQuery, MapQuery},
    response::{CompetitionResponse, MapMarkerResponse},
};

/// List competitions (public); the total across pages is sent in
/// `X-Total-Count`
pub async fn list_competitions(
    State(state): State<AppState>,
    Query(query): Query<ListCompetitionsQuery>,
) -> AppResult<impl IntoResponse> {
    let criteria = ListCriteria {
        status: parse_status(query.status.as_deref())?,
        organizer_id: query.organizer_id,
        upcoming: query.upcoming.unwrap_or(false),
        within: query
            .within
            .as_deref()
            .map(str::parse::<DateWindow>)
            .transpose()
            .map_err(AppError::InvalidInput)?,
        page: query.page,
        per_page: query.per_page,
    };

    let (listings, total) = CompetitionService::list(state.db(), criteria).await?;
    let body: Vec<CompetitionResponse> = listings.into_iter().map(Into::into).collect();

    Ok(([(TOTAL_COUNT_HEADER, total.to_string())], Json(body)))
}

/// Get one competition by slug (public)
pub async fn get_competition(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CompetitionResponse>> {
    let listing = CompetitionService::get_by_slug(state.db(), &slug).await?;
    Ok(Json(listing.into()))
}

/// Create a competition (organizers only)
pub async fn create_competition(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateCompetitionRequest>,
) -> AppResult<(StatusCode, Json<Competition>)> {
    require(&auth_user, Action::CreateCompetition)?;
    payload.validate()?;

    let competition = CompetitionService::create(
        state.db(),
        state.geocoder(),
        auth_user.id,
        payload.into_raw(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(competition)))
}

/// Map markers, optionally within a radius of a point (public)
pub async fn map_markers(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> AppResult<Json<Vec<MapMarkerResponse>>> {
    let status = parse_status(query.status.as_deref())?;

    let area = match (query.lat, query.lon, query.radius_km) {
        (Some(lat), Some(lon), Some(radius_km)) => {
            let center = Coordinates::new(lat, lon);
            if !center.is_valid() || radius_km <= 0.0 {
                return Err(AppError::InvalidInput(
                    "lat/lon must be valid coordinates and radiusKm positive".to_string(),
                ));
            }
            Some((center, radius_km))
        }
        _ => None,
    };

    let markers = CompetitionService::map_markers(state.db(), status, area).await?;

    Ok(Json(markers.into_iter().map(Into::into).collect()))
}

/// Download every competition as CSV (administrators only)
pub async fn export_competitions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    require(&auth_user, Action::ExportCompetitions)?;

    let csv = CompetitionService::export_csv(state.db()).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"competitions.csv\""),
        ],
        csv,
    ))
}

/// Import competitions from an uploaded CSV file (administrators only)
pub async fn import_competitions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    require(&auth_user, Action::ImportCompetitions)?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(IMPORT_FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Could not read upload: {}", e)))?;
            file = Some(bytes);
            break;
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{}'", IMPORT_FILE_FIELD))
    })?;

    let report =
        CompetitionService::import_csv(state.db(), state.geocoder(), auth_user.id, &file).await?;

    Ok(Json(report))
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<CompetitionStatus>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(str::parse::<CompetitionStatus>)
        .transpose()
        .map_err(AppError::InvalidInput)
}
