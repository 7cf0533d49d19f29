//! Business logic services

pub mod auth_service;
pub mod authorization;
pub mod competition_service;
pub mod dashboard_service;
pub mod participation_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use authorization::{authorize, require, Action, Decision, Subject};
pub use competition_service::CompetitionService;
pub use dashboard_service::DashboardService;
pub use participation_service::ParticipationService;
pub use user_service::UserService;
