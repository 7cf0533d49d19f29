//! Competition service

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::{
        ActivityRepository, CompetitionFilter, CompetitionRepository, CompetitionRow, Page,
        ParticipantSummary, ParticipationRepository,
    },
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::{AppError, AppResult},
    import::{self, Geocoder, ImportOptions, ImportReport, PgCompetitionStore, RawRecord},
    models::{ActivityType, Competition, CompetitionStatus, Coordinates},
};

/// Date window offered by the listing filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// The current calendar day (UTC)
    Today,
    /// From now until seven days ahead
    Week,
    /// From now until the same day next month
    Month,
}

impl DateWindow {
    /// `[from, until)` bounds relative to `now`
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Today => {
                let start = now
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|naive| naive.and_utc())
                    .unwrap_or(now);
                (start, start + Duration::days(1))
            }
            Self::Week => (now, now + Duration::days(7)),
            Self::Month => (
                now,
                now.checked_add_months(Months::new(1))
                    .unwrap_or(now + Duration::days(30)),
            ),
        }
    }
}

impl FromStr for DateWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("unknown date window '{}'", other)),
        }
    }
}

/// Listing criteria as received from the API
#[derive(Debug, Clone, Default)]
pub struct ListCriteria {
    pub status: Option<CompetitionStatus>,
    pub organizer_id: Option<Uuid>,
    pub upcoming: bool,
    pub within: Option<DateWindow>,
    /// 1-based page number
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListCriteria {
    /// Requested page, if any; page size is clamped to the maximum
    fn page(&self) -> Option<Page> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let per_page = self.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);

        Some(Page {
            limit: i64::from(per_page),
            offset: i64::from(page - 1) * i64::from(per_page),
        })
    }

    fn into_filter(self, now: DateTime<Utc>) -> CompetitionFilter {
        let (mut from, until) = match self.within {
            Some(window) => {
                let (from, until) = window.bounds(now);
                (Some(from), Some(until))
            }
            None => (None, None),
        };

        if self.upcoming {
            from = Some(from.map_or(now, |f| f.max(now)));
        }

        CompetitionFilter {
            status: self.status,
            organizer_id: self.organizer_id,
            from,
            until,
        }
    }
}

/// Competition with its organizer name and participant entries
#[derive(Debug, Clone)]
pub struct CompetitionListing {
    pub competition: Competition,
    pub organizer_name: String,
    pub participants: Vec<ParticipantSummary>,
}

/// A competition placed on the map
#[derive(Debug, Clone)]
pub struct MapMarker {
    pub competition: Competition,
    pub coordinates: Coordinates,
    /// Distance from the query center, when one was given
    pub distance_km: Option<f64>,
}

/// Competition service for business logic
pub struct CompetitionService;

impl CompetitionService {
    /// Create a competition owned by the organizer; always starts OPEN
    pub async fn create(
        pool: &PgPool,
        geocoder: &dyn Geocoder,
        organizer_id: Uuid,
        mut raw: RawRecord,
    ) -> AppResult<Competition> {
        raw.insert("organizerId", organizer_id.to_string());
        raw.insert("status", CompetitionStatus::Open.as_str());

        let mut record = import::validate(&raw)?;
        if record.coordinates.is_none() {
            record.coordinates = geocoder.lookup(&record.location).await;
        }

        let mut tx = pool.begin().await?;

        let competition = CompetitionRepository::insert(&mut *tx, &record)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict(format!(
                    "A competition with key '{}' already exists",
                    record.slug
                )),
                other => other,
            })?;

        ActivityRepository::append(
            &mut *tx,
            ActivityType::CompetitionCreated,
            &format!("New competition: {}", competition.title),
            &format!("Scheduled for {}", competition.date.format("%Y-%m-%d %H:%M")),
            Some(organizer_id),
            Some(competition.id),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            competition_id = %competition.id,
            slug = %competition.slug,
            organizer_id = %organizer_id,
            "Competition created"
        );

        Ok(competition)
    }

    /// Get one competition by slug
    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> AppResult<CompetitionListing> {
        let row = CompetitionRepository::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Competition not found".to_string()))?;

        let participants =
            ParticipationRepository::summaries_for(pool, &[row.competition.id]).await?;

        Ok(CompetitionListing {
            competition: row.competition,
            organizer_name: row.organizer_name,
            participants,
        })
    }

    /// List competitions, earliest first, with the number of matches
    /// across all pages
    pub async fn list(
        pool: &PgPool,
        criteria: ListCriteria,
    ) -> AppResult<(Vec<CompetitionListing>, i64)> {
        let page = criteria.page();
        let filter = criteria.into_filter(Utc::now());
        let rows = CompetitionRepository::list(pool, &filter, page).await?;

        let total = match page {
            Some(_) => CompetitionRepository::count(pool, &filter).await?,
            None => rows.len() as i64,
        };

        let ids: Vec<Uuid> = rows.iter().map(|r| r.competition.id).collect();
        let summaries = ParticipationRepository::summaries_for(pool, &ids).await?;

        Ok((attach_participants(rows, summaries), total))
    }

    /// Competitions with coordinates, optionally limited to a radius
    pub async fn map_markers(
        pool: &PgPool,
        status: Option<CompetitionStatus>,
        area: Option<(Coordinates, f64)>,
    ) -> AppResult<Vec<MapMarker>> {
        let competitions = CompetitionRepository::list_located(pool, status).await?;
        Ok(place_markers(competitions, area))
    }

    /// Every competition as canonical CSV
    pub async fn export_csv(pool: &PgPool) -> AppResult<Vec<u8>> {
        let competitions = CompetitionRepository::list_all(pool).await?;

        let mut buffer = Vec::new();
        import::write_competitions(&mut buffer, &competitions)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV export failed: {}", e)))?;

        tracing::info!(count = competitions.len(), "Competitions exported");
        Ok(buffer)
    }

    /// Run an uploaded CSV file through the import pipeline
    pub async fn import_csv(
        pool: &PgPool,
        geocoder: &dyn Geocoder,
        operator_id: Uuid,
        file: &[u8],
    ) -> AppResult<ImportReport> {
        let (version, rows) = import::read_records(file, Some(operator_id))
            .map_err(|e| AppError::Validation(format!("Malformed CSV file: {}", e)))?;

        tracing::info!(
            operator_id = %operator_id,
            rows = rows.len(),
            schema = ?version,
            "Starting competition import"
        );

        let store = PgCompetitionStore::new(pool.clone());
        Ok(import::run_import(rows, &store, geocoder, &ImportOptions::default()).await)
    }
}

fn attach_participants(
    rows: Vec<CompetitionRow>,
    summaries: Vec<ParticipantSummary>,
) -> Vec<CompetitionListing> {
    let mut by_competition: HashMap<Uuid, Vec<ParticipantSummary>> = HashMap::new();
    for summary in summaries {
        by_competition
            .entry(summary.competition_id)
            .or_default()
            .push(summary);
    }

    rows.into_iter()
        .map(|row| CompetitionListing {
            participants: by_competition
                .remove(&row.competition.id)
                .unwrap_or_default(),
            competition: row.competition,
            organizer_name: row.organizer_name,
        })
        .collect()
}

/// Keep competitions inside the area (if any), nearest first
fn place_markers(
    competitions: Vec<Competition>,
    area: Option<(Coordinates, f64)>,
) -> Vec<MapMarker> {
    let mut markers: Vec<MapMarker> = competitions
        .into_iter()
        .filter_map(|competition| {
            let coordinates = competition.coordinates()?;
            let distance_km = area.map(|(center, _)| center.distance_km(&coordinates));
            Some(MapMarker {
                competition,
                coordinates,
                distance_km,
            })
        })
        .collect();

    if let Some((_, radius_km)) = area {
        markers.retain(|m| m.distance_km.is_some_and(|d| d <= radius_km));
        markers.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    markers
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{Modality, ParticipationStatus};

    fn competition(slug: &str, coordinates: Option<(f64, f64)>) -> Competition {
        Competition {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            display_name: slug.to_string(),
            title: slug.to_string(),
            description: "Weekly freestyle jam".to_string(),
            date: Utc::now(),
            location: "CABA".to_string(),
            latitude: coordinates.map(|c| c.0),
            longitude: coordinates.map(|c| c.1),
            max_participants: 16,
            status: CompetitionStatus::Open,
            modality: Modality::OneVsOne,
            image: None,
            rating: None,
            price: None,
            prize: None,
            judges: vec![],
            hosts: vec![],
            dj: None,
            photographer: None,
            organizer_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 15, 30, 0).unwrap();

        let (from, until) = DateWindow::Today.bounds(now);
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());
        assert_eq!(until, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());

        let (from, until) = DateWindow::Week.bounds(now);
        assert_eq!((from, until - from), (now, Duration::days(7)));

        // Clamped to the last day of February
        let (_, until) = DateWindow::Month.bounds(now);
        assert_eq!(until, Utc.with_ymd_and_hms(2025, 2, 28, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_upcoming_never_moves_from_backwards() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 15, 30, 0).unwrap();

        let filter = ListCriteria {
            upcoming: true,
            within: Some(DateWindow::Today),
            ..Default::default()
        }
        .into_filter(now);
        assert_eq!(filter.from, Some(now));
        assert_eq!(filter.until, Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));

        let filter = ListCriteria::default().into_filter(now);
        assert!(filter.from.is_none() && filter.until.is_none());
    }

    #[test]
    fn test_page_only_when_requested() {
        assert_eq!(ListCriteria::default().page(), None);

        let criteria = ListCriteria {
            page: Some(3),
            ..Default::default()
        };
        assert_eq!(
            criteria.page(),
            Some(Page {
                limit: i64::from(DEFAULT_PAGE_SIZE),
                offset: 2 * i64::from(DEFAULT_PAGE_SIZE)
            })
        );

        let criteria = ListCriteria {
            page: Some(0),
            per_page: Some(1000),
            ..Default::default()
        };
        assert_eq!(
            criteria.page(),
            Some(Page {
                limit: i64::from(MAX_PAGE_SIZE),
                offset: 0
            })
        );
    }

    #[test]
    fn test_participants_are_grouped_by_competition() {
        let a = competition("a", None);
        let b = competition("b", None);
        let summary = |competition_id| ParticipantSummary {
            id: Uuid::new_v4(),
            competition_id,
            status: ParticipationStatus::Pending,
        };

        let rows = vec![
            CompetitionRow {
                competition: a.clone(),
                organizer_name: "Org".to_string(),
            },
            CompetitionRow {
                competition: b.clone(),
                organizer_name: "Org".to_string(),
            },
        ];
        let listings = attach_participants(rows, vec![summary(a.id), summary(a.id)]);

        assert_eq!(listings[0].participants.len(), 2);
        assert!(listings[1].participants.is_empty());
    }

    #[test]
    fn test_markers_filtered_by_radius_nearest_first() {
        let obelisco = Coordinates::new(-34.6037, -58.3815);
        let competitions = vec![
            competition("palermo", Some((-34.5889, -58.4245))),
            competition("cordoba", Some((-31.4201, -64.1888))),
            competition("microcentro", Some((-34.6030, -58.3800))),
            competition("sin-ubicacion", None),
        ];

        let markers = place_markers(competitions.clone(), Some((obelisco, 10.0)));
        let slugs: Vec<_> = markers.iter().map(|m| m.competition.slug.as_str()).collect();
        assert_eq!(slugs, vec!["microcentro", "palermo"]);

        let all = place_markers(competitions, None);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|m| m.distance_km.is_none()));
    }
}
