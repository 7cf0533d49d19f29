//! Dashboard service

use sqlx::PgPool;

use crate::{
    constants::{DEFAULT_ACTIVITY_LIMIT, MAX_ACTIVITY_LIMIT},
    db::repositories::{ActivityRepository, DashboardCounts},
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{Activity, UserRole},
};

/// Dashboard service for business logic
pub struct DashboardService;

impl DashboardService {
    /// Counters for the session user; organizers see their competitions,
    /// everyone else sees their participations
    pub async fn stats(pool: &PgPool, user: &AuthenticatedUser) -> AppResult<DashboardCounts> {
        match user.role {
            UserRole::Organizer => ActivityRepository::organizer_counts(pool, &user.id).await,
            _ => ActivityRepository::participant_counts(pool, &user.id).await,
        }
    }

    /// Most recent activity relevant to the session user
    pub async fn recent_activity(
        pool: &PgPool,
        user: &AuthenticatedUser,
        limit: Option<i64>,
    ) -> AppResult<Vec<Activity>> {
        let limit = clamp_limit(limit);

        match user.role {
            UserRole::Organizer => {
                ActivityRepository::recent_for_organizer(pool, &user.id, limit).await
            }
            _ => ActivityRepository::recent_for_participant(pool, &user.id, limit).await,
        }
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}
