//! Competition request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::{
    MAX_COMPETITION_DESCRIPTION_LENGTH, MAX_COMPETITION_TITLE_LENGTH, MAX_PARTICIPANTS,
    MIN_COMPETITION_DESCRIPTION_LENGTH, MIN_COMPETITION_TITLE_LENGTH, MIN_LOCATION_LENGTH,
    MIN_PARTICIPANTS,
};
use crate::import::RawRecord;
use crate::models::Modality;

/// Create competition request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetitionRequest {
    #[validate(length(min = MIN_COMPETITION_TITLE_LENGTH, max = MAX_COMPETITION_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(
        min = MIN_COMPETITION_DESCRIPTION_LENGTH,
        max = MAX_COMPETITION_DESCRIPTION_LENGTH
    ))]
    pub description: String,

    /// ISO 8601 date-time
    pub date: String,

    #[validate(length(min = MIN_LOCATION_LENGTH))]
    pub location: String,

    #[validate(range(min = MIN_PARTICIPANTS, max = MAX_PARTICIPANTS))]
    pub max_participants: i32,

    pub display_name: Option<String>,
    pub modality: Option<Modality>,
    pub image: Option<String>,
    pub price: Option<String>,
    pub prize: Option<String>,
    #[serde(default)]
    pub judges: Vec<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    pub dj: Option<String>,
    pub photographer: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreateCompetitionRequest {
    /// Hand the payload to the shared record validator
    pub fn into_raw(self) -> RawRecord {
        let mut raw: RawRecord = [
            ("title", self.title),
            ("description", self.description),
            ("date", self.date),
            ("location", self.location),
            ("maxParticipants", self.max_participants.to_string()),
            ("judges", self.judges.join(",")),
            ("hosts", self.hosts.join(",")),
        ]
        .into_iter()
        .collect();

        let optional = [
            ("displayName", self.display_name),
            ("modality", self.modality.map(|m| m.as_str().to_string())),
            ("image", self.image),
            ("price", self.price),
            ("prize", self.prize),
            ("dj", self.dj),
            ("photographer", self.photographer),
            ("latitude", self.latitude.map(|v| v.to_string())),
            ("longitude", self.longitude.map(|v| v.to_string())),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                raw.insert(key, value);
            }
        }

        raw
    }
}

/// Query parameters for listing competitions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCompetitionsQuery {
    pub status: Option<String>,
    pub organizer_id: Option<Uuid>,
    pub upcoming: Option<bool>,
    /// today, week or month
    pub within: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters for map markers
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCompetitionRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Open Mic Night",
            "description": "Weekly freestyle jam",
            "date": "2025-03-01T20:00:00Z",
            "location": "Palermo, CABA",
            "maxParticipants": 16
        }))
        .unwrap()
    }

    #[test]
    fn test_bounds_follow_create_form() {
        assert!(request().validate().is_ok());

        let mut short = request();
        short.description = "too short".to_string();
        assert!(short.validate().is_err());

        let mut crowded = request();
        crowded.max_participants = 65;
        assert!(crowded.validate().is_err());
    }

    #[test]
    fn test_into_raw_omits_absent_fields() {
        let mut req = request();
        req.judges = vec!["KIRO".to_string(), "CLAP".to_string()];
        let raw = req.into_raw();

        assert_eq!(raw.get("maxParticipants"), Some("16"));
        assert_eq!(raw.get("judges"), Some("KIRO,CLAP"));
        assert!(!raw.contains("hosts"));
        assert!(!raw.contains("latitude"));
    }
}
