//! Participation service

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::{
        ActivityRepository, CompetitionRepository, ParticipationFilter, ParticipationRepository,
        ParticipationRow,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    models::{ActivityType, Competition, Participation},
};

/// Why a join request cannot be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRefusal {
    NotOpen,
    AlreadyRequested,
    Full,
}

impl From<JoinRefusal> for AppError {
    fn from(refusal: JoinRefusal) -> Self {
        let message = match refusal {
            JoinRefusal::NotOpen => "Competition is not open for registration",
            JoinRefusal::AlreadyRequested => "You already requested to join this competition",
            JoinRefusal::Full => "Competition is full",
        };
        AppError::Conflict(message.to_string())
    }
}

/// Decide whether a join request may proceed, given a locked snapshot
pub fn check_join(
    competition: &Competition,
    already_requested: bool,
    seats_taken: i64,
) -> Result<(), JoinRefusal> {
    if !competition.is_open() {
        return Err(JoinRefusal::NotOpen);
    }
    if already_requested {
        return Err(JoinRefusal::AlreadyRequested);
    }
    if seats_taken >= i64::from(competition.max_participants) {
        return Err(JoinRefusal::Full);
    }
    Ok(())
}

/// Participation service for business logic
pub struct ParticipationService;

impl ParticipationService {
    /// Ask to join a competition.
    ///
    /// The competition row stays locked from the capacity check until the
    /// insert commits, so concurrent requests for the last seat serialize.
    pub async fn request(
        pool: &PgPool,
        user: &AuthenticatedUser,
        competition_id: &Uuid,
    ) -> AppResult<Participation> {
        let mut tx = pool.begin().await?;

        let competition = CompetitionRepository::lock_for_update(&mut *tx, competition_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Competition not found".to_string()))?;

        let already_requested =
            ParticipationRepository::exists(&mut *tx, &user.id, competition_id).await?;
        let seats_taken = ParticipationRepository::count_seats(&mut *tx, competition_id).await?;

        if let Err(refusal) = check_join(&competition, already_requested, seats_taken) {
            tracing::debug!(
                user_id = %user.id,
                competition_id = %competition_id,
                ?refusal,
                "Participation refused"
            );
            return Err(refusal.into());
        }

        let participation =
            ParticipationRepository::insert(&mut *tx, &user.id, competition_id).await?;

        ActivityRepository::append(
            &mut *tx,
            ActivityType::ParticipationRequested,
            &format!("New participation request: {}", competition.title),
            &format!("{} asked to join", user.name),
            Some(user.id),
            Some(competition.id),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            participation_id = %participation.id,
            user_id = %user.id,
            competition_id = %competition_id,
            "Participation requested"
        );

        Ok(participation)
    }

    /// List participations, optionally by competition and/or user
    pub async fn list(
        pool: &PgPool,
        filter: &ParticipationFilter,
    ) -> AppResult<Vec<ParticipationRow>> {
        ParticipationRepository::list(pool, filter).await
    }
}
