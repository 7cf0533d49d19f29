//! Participation request DTOs

use serde::Deserialize;
use uuid::Uuid;

/// Join request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParticipationRequest {
    pub competition_id: Uuid,
}

/// List participations query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParticipationsQuery {
    pub competition_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}
