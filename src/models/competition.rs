//! Competition model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Competition database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: Uuid,
    /// URL-safe unique key derived from the title
    pub slug: String,
    pub display_name: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_participants: i32,
    pub status: CompetitionStatus,
    pub modality: Modality,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<String>,
    pub prize: Option<String>,
    pub judges: Vec<String>,
    pub hosts: Vec<String>,
    pub dj: Option<String>,
    pub photographer: Option<String>,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    /// Resolved coordinates, if both halves are stored
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Whether new participation requests are accepted
    pub fn is_open(&self) -> bool {
        self.status == CompetitionStatus::Open
    }
}

/// A resolved geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both halves lie within valid WGS84 bounds
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in kilometers (haversine)
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * crate::constants::EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Competition lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "competition_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionStatus {
    Open,
    InProgress,
    Finished,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
        }
    }
}

impl Default for CompetitionStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl FromStr for CompetitionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "FINISHED" => Ok(Self::Finished),
            other => Err(format!("unknown competition status '{}'", other)),
        }
    }
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Battle format of a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "competition_modality", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    OneVsOne,
    TwoVsTwo,
    ThreeVsThree,
    Exhibition,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneVsOne => "ONE_VS_ONE",
            Self::TwoVsTwo => "TWO_VS_TWO",
            Self::ThreeVsThree => "THREE_VS_THREE",
            Self::Exhibition => "EXHIBITION",
        }
    }
}

impl Default for Modality {
    fn default() -> Self {
        Self::OneVsOne
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONE_VS_ONE" | "1VS1" => Ok(Self::OneVsOne),
            "TWO_VS_TWO" | "2VS2" => Ok(Self::TwoVsTwo),
            "THREE_VS_THREE" | "3VS3" => Ok(Self::ThreeVsThree),
            "EXHIBITION" => Ok(Self::Exhibition),
            other => Err(format!("unknown modality '{}'", other)),
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
