//! Participation repository

use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Participation, ParticipationStatus},
};

/// Filters for listing participations
#[derive(Debug, Clone, Default)]
pub struct ParticipationFilter {
    pub competition_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Participation joined with the names a listing shows
#[derive(Debug, Clone, FromRow)]
pub struct ParticipationRow {
    #[sqlx(flatten)]
    pub participation: Participation,
    pub user_name: String,
    pub competition_title: String,
    pub competition_slug: String,
}

/// Minimal participant entry embedded in competition listings
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub status: ParticipationStatus,
}

/// Repository for participation database operations
pub struct ParticipationRepository;

impl ParticipationRepository {
    /// Insert a PENDING participation
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: &Uuid,
        competition_id: &Uuid,
    ) -> AppResult<Participation> {
        let participation = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participations (user_id, competition_id, status)
            VALUES ($1, $2, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(competition_id)
        .fetch_one(executor)
        .await?;

        Ok(participation)
    }

    /// Whether the user already asked to join the competition
    pub async fn exists<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: &Uuid,
        competition_id: &Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participations WHERE user_id = $1 AND competition_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(competition_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Participations holding a seat (PENDING or ACCEPTED)
    pub async fn count_seats<'e, E: PgExecutor<'e>>(
        executor: E,
        competition_id: &Uuid,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM participations
            WHERE competition_id = $1 AND status IN ('PENDING', 'ACCEPTED')
            "#,
        )
        .bind(competition_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// List participations, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &ParticipationFilter,
    ) -> AppResult<Vec<ParticipationRow>> {
        let rows = sqlx::query_as::<_, ParticipationRow>(
            r#"
            SELECT p.*, u.name AS user_name, c.title AS competition_title, c.slug AS competition_slug
            FROM participations p
            JOIN users u ON u.id = p.user_id
            JOIN competitions c ON c.id = p.competition_id
            WHERE ($1::uuid IS NULL OR p.competition_id = $1)
              AND ($2::uuid IS NULL OR p.user_id = $2)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(filter.competition_id)
        .bind(filter.user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Participant entries for a set of competitions
    pub async fn summaries_for(
        pool: &PgPool,
        competition_ids: &[Uuid],
    ) -> AppResult<Vec<ParticipantSummary>> {
        let summaries = sqlx::query_as::<_, ParticipantSummary>(
            r#"
            SELECT id, competition_id, status
            FROM participations
            WHERE competition_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(competition_ids)
        .fetch_all(pool)
        .await?;

        Ok(summaries)
    }
}
