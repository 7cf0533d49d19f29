//! Participation response DTOs

use serde::Serialize;

use crate::{db::repositories::ParticipationRow, models::Participation};

/// Participation with the user and competition it links
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationResponse {
    #[serde(flatten)]
    pub participation: Participation,
    pub user_name: String,
    pub competition_title: String,
    pub competition_slug: String,
}

impl From<ParticipationRow> for ParticipationResponse {
    fn from(row: ParticipationRow) -> Self {
        Self {
            participation: row.participation,
            user_name: row.user_name,
            competition_title: row.competition_title,
            competition_slug: row.competition_slug,
        }
    }
}
