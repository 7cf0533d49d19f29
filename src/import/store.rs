//! Storage seam for the import pipeline

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::repositories::{ActivityRepository, CompetitionRepository};
use crate::error::AppResult;
use crate::models::ActivityType;

use super::record::CompetitionRecord;

/// Result of a single upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated {
        /// The stored row had coordinates and the update removed them
        coordinates_cleared: bool,
    },
}

/// Where validated records end up, keyed by slug.
///
/// Updates keep the organizer and creation time of the existing row.
#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn upsert_by_slug(&self, record: &CompetitionRecord) -> AppResult<UpsertOutcome>;
}

/// Postgres-backed store; inserts are recorded in the activity log
#[derive(Debug, Clone)]
pub struct PgCompetitionStore {
    pool: PgPool,
}

impl PgCompetitionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompetitionStore for PgCompetitionStore {
    async fn upsert_by_slug(&self, record: &CompetitionRecord) -> AppResult<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let upserted = CompetitionRepository::upsert_by_slug(&mut *tx, record).await?;

        if upserted.inserted {
            let competition = &upserted.competition;
            ActivityRepository::append(
                &mut *tx,
                ActivityType::CompetitionCreated,
                &format!("New competition: {}", competition.title),
                &format!("Imported, scheduled for {}", competition.date.format("%Y-%m-%d")),
                Some(competition.organizer_id),
                Some(competition.id),
            )
            .await?;
        }

        tx.commit().await?;

        Ok(if upserted.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated {
                coordinates_cleared: upserted.coordinates_cleared,
            }
        })
    }
}
