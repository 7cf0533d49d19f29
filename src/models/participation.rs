//! Participation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A competitor's request to join a competition
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub competition_id: Uuid,
    pub status: ParticipationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Approval state of a participation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "participation_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ParticipationStatus {
    /// Whether this participation holds a seat against capacity
    pub fn occupies_seat(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}
