//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod activity_repo;
pub mod competition_repo;
pub mod participation_repo;
pub mod user_repo;

pub use activity_repo::{ActivityRepository, DashboardCounts};
pub use competition_repo::{
    CompetitionFilter, CompetitionRepository, CompetitionRow, Page, UpsertedCompetition,
};
pub use participation_repo::{
    ParticipantSummary, ParticipationFilter, ParticipationRepository, ParticipationRow,
};
pub use user_repo::UserRepository;
