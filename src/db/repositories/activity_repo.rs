//! Activity log and dashboard statistics

use serde::Serialize;
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Activity, ActivityType},
};

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub active_competitions: i64,
    pub participants: i64,
    pub upcoming_competitions: i64,
}

/// Repository for the activity log
pub struct ActivityRepository;

impl ActivityRepository {
    /// Append an entry to the log
    pub async fn append<'e, E: PgExecutor<'e>>(
        executor: E,
        kind: ActivityType,
        title: &str,
        description: &str,
        user_id: Option<Uuid>,
        competition_id: Option<Uuid>,
    ) -> AppResult<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (type, title, description, user_id, competition_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(title)
        .bind(description)
        .bind(user_id)
        .bind(competition_id)
        .fetch_one(executor)
        .await?;

        Ok(activity)
    }

    /// Recent entries relevant to an organizer: their own creations plus
    /// participation activity on competitions they run
    pub async fn recent_for_organizer(
        pool: &PgPool,
        organizer_id: &Uuid,
        limit: i64,
    ) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT a.*
            FROM activities a
            LEFT JOIN competitions c ON c.id = a.competition_id
            WHERE (a.type = 'COMPETITION_CREATED' AND a.user_id = $1)
               OR (a.type IN ('PARTICIPATION_REQUESTED', 'PARTICIPATION_UPDATED')
                   AND c.organizer_id = $1)
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(organizer_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Recent entries relevant to anyone else: their own actions plus
    /// activity on competitions they asked to join
    pub async fn recent_for_participant(
        pool: &PgPool,
        user_id: &Uuid,
        limit: i64,
    ) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT a.*
            FROM activities a
            WHERE a.user_id = $1
               OR EXISTS (
                   SELECT 1 FROM participations p
                   WHERE p.competition_id = a.competition_id AND p.user_id = $1
               )
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(activities)
    }

    /// Counters shown to an organizer
    pub async fn organizer_counts(pool: &PgPool, organizer_id: &Uuid) -> AppResult<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM competitions
                 WHERE organizer_id = $1 AND status = 'OPEN') AS active_competitions,
                (SELECT COUNT(*) FROM participations p
                 JOIN competitions c ON c.id = p.competition_id
                 WHERE c.organizer_id = $1) AS participants,
                (SELECT COUNT(*) FROM competitions
                 WHERE organizer_id = $1 AND date > NOW()) AS upcoming_competitions
            "#,
        )
        .bind(organizer_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }

    /// Counters shown to everyone else
    pub async fn participant_counts(pool: &PgPool, user_id: &Uuid) -> AppResult<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM participations p
                 JOIN competitions c ON c.id = p.competition_id
                 WHERE p.user_id = $1 AND p.status = 'ACCEPTED' AND c.status = 'OPEN')
                    AS active_competitions,
                (SELECT COUNT(*) FROM participations WHERE user_id = $1) AS participants,
                (SELECT COUNT(DISTINCT c.id) FROM competitions c
                 JOIN participations p ON p.competition_id = c.id
                 WHERE p.user_id = $1 AND p.status = 'ACCEPTED' AND c.date > NOW())
                    AS upcoming_competitions
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}
