//! Role-based authorization policy
//!
//! Every role check in the HTTP layer goes through [`authorize`], a pure
//! function of the subject and the requested action.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    models::UserRole,
};

/// Who is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl From<&AuthenticatedUser> for Subject {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// What they want to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCompetition,
    ImportCompetitions,
    ExportCompetitions,
    RequestParticipation,
    ListParticipations,
    UpdateProfile { user_id: Uuid },
    ViewDashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

pub fn authorize(subject: &Subject, action: &Action) -> Decision {
    use Decision::{Allow, Deny};

    match action {
        Action::CreateCompetition => match subject.role {
            UserRole::Organizer => Allow,
            _ => Deny("Only organizers can create competitions"),
        },
        Action::ImportCompetitions | Action::ExportCompetitions => match subject.role {
            UserRole::Admin => Allow,
            _ => Deny("Only administrators can import or export competitions"),
        },
        Action::RequestParticipation => match subject.role {
            UserRole::Competitor => Allow,
            _ => Deny("Only competitors can request to participate"),
        },
        Action::UpdateProfile { user_id } => {
            if *user_id == subject.user_id || subject.role == UserRole::Admin {
                Allow
            } else {
                Deny("Cannot update other users' profiles")
            }
        }
        Action::ListParticipations | Action::ViewDashboard => Allow,
    }
}

/// Fail with `Forbidden` unless the user may perform the action
pub fn require(user: &AuthenticatedUser, action: Action) -> AppResult<()> {
    match authorize(&Subject::from(user), &action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::debug!(user_id = %user.id, role = %user.role, ?action, "Access denied");
            Err(AppError::Forbidden(reason.to_string()))
        }
    }
}
