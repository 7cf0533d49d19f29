//! Competition response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Competition, CompetitionStatus, Modality, ParticipationStatus};
use crate::services::competition_service::{CompetitionListing, MapMarker};

/// Organizer summary embedded in a competition
#[derive(Debug, Serialize)]
pub struct OrganizerSummary {
    pub id: Uuid,
    pub name: String,
}

/// Participant entry embedded in a competition
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub status: ParticipationStatus,
}

/// Competition with organizer and participants
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionResponse {
    #[serde(flatten)]
    pub competition: Competition,
    pub organizer: OrganizerSummary,
    pub participants: Vec<ParticipantResponse>,
    /// Participations currently holding a seat
    pub seats_taken: usize,
}

impl From<CompetitionListing> for CompetitionResponse {
    fn from(listing: CompetitionListing) -> Self {
        let seats_taken = listing
            .participants
            .iter()
            .filter(|p| p.status.occupies_seat())
            .count();

        Self {
            organizer: OrganizerSummary {
                id: listing.competition.organizer_id,
                name: listing.organizer_name,
            },
            participants: listing
                .participants
                .into_iter()
                .map(|p| ParticipantResponse {
                    id: p.id,
                    status: p.status,
                })
                .collect(),
            seats_taken,
            competition: listing.competition,
        }
    }
}

/// Marker shown on the map
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarkerResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: CompetitionStatus,
    pub modality: Modality,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<MapMarker> for MapMarkerResponse {
    fn from(marker: MapMarker) -> Self {
        let c = marker.competition;
        Self {
            id: c.id,
            slug: c.slug,
            title: c.title,
            date: c.date,
            location: c.location,
            latitude: marker.coordinates.latitude,
            longitude: marker.coordinates.longitude,
            status: c.status,
            modality: c.modality,
            image: c.image,
            distance_km: marker.distance_km,
        }
    }
}
