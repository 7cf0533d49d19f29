//! Address lookup against the MapTiler geocoding API

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::config::GeocodingConfig;
use crate::constants::{GEOCODING_MIN_RELEVANCE, GEOCODING_PREFERRED_PLACE_TYPES};
use crate::models::Coordinates;

/// Resolves free-text locations to coordinates.
///
/// Lookups never fail: any network, HTTP or decoding problem is logged
/// and reported as "not found".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, location: &str) -> Option<Coordinates>;
}

#[derive(Debug, thiserror::Error)]
enum GeocodeError {
    #[error("invalid geocoding base url")]
    InvalidUrl,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    /// `[longitude, latitude]`
    center: [f64; 2],
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    place_type: Vec<String>,
    #[serde(default)]
    relevance: f64,
}

impl Feature {
    fn is_preferred(&self) -> bool {
        self.relevance > GEOCODING_MIN_RELEVANCE
            && self
                .place_type
                .iter()
                .any(|t| GEOCODING_PREFERRED_PLACE_TYPES.contains(&t.as_str()))
    }

    fn coordinates(&self) -> Coordinates {
        let [longitude, latitude] = self.center;
        Coordinates::new(latitude, longitude)
    }
}

/// First relevant address or point of interest, else the top-ranked match
fn select_candidate(features: &[Feature]) -> Option<&Feature> {
    features
        .iter()
        .find(|f| f.is_preferred())
        .or_else(|| features.first())
}

/// MapTiler-backed [`Geocoder`]
#[derive(Debug, Clone)]
pub struct MapTilerGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    country: String,
}

impl MapTilerGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
        })
    }

    fn request_url(&self, location: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&self.base_url).map_err(|_| GeocodeError::InvalidUrl)?;

        url.path_segments_mut()
            .map_err(|_| GeocodeError::InvalidUrl)?
            .pop_if_empty()
            .push("geocoding")
            .push(&format!("{}.json", location));

        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("language", &self.language)
            .append_pair("country", &self.country);

        Ok(url)
    }

    async fn fetch(&self, location: &str) -> Result<FeatureCollection, GeocodeError> {
        let response = self.client.get(self.request_url(location)?).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        Ok(response.json::<FeatureCollection>().await?)
    }
}

#[async_trait]
impl Geocoder for MapTilerGeocoder {
    async fn lookup(&self, location: &str) -> Option<Coordinates> {
        tracing::debug!(location, "Geocoding location");

        let collection = match self.fetch(location).await {
            Ok(collection) => collection,
            Err(e) => {
                tracing::warn!(location, error = %e, "Geocoding failed");
                return None;
            }
        };

        let Some(feature) = select_candidate(&collection.features) else {
            tracing::info!(location, "No coordinates found for location");
            return None;
        };

        let coordinates = feature.coordinates();
        if !coordinates.is_valid() {
            tracing::warn!(location, ?coordinates, "Geocoder returned out-of-range coordinates");
            return None;
        }

        tracing::debug!(
            location,
            place = %feature.place_name,
            relevance = feature.relevance,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "Selected geocoding candidate"
        );
        Some(coordinates)
    }
}
