//! Row-by-row reconciliation of raw records into the competition store

use serde::Serialize;

use crate::models::Coordinates;

use super::geocoding::Geocoder;
use super::record::{validate, ImportRow};
use super::store::{CompetitionStore, UpsertOutcome};

pub const WARNING_COORDINATES_CLEARED: &str = "stored coordinates cleared";
pub const WARNING_NOT_GEOCODED: &str = "location could not be geocoded";
pub const WARNING_FALLBACK_COORDINATES: &str = "location could not be geocoded, fallback coordinates used";

/// Per-run import settings
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Applied when a row has no coordinates and the geocoder finds none
    pub fallback_coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowOutcome {
    Created,
    Updated,
    Skipped,
}

/// What happened to one input row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReport {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub outcome: RowOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Totals plus per-row outcomes of one run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub rows: Vec<RowReport>,
}

impl ImportReport {
    fn push(&mut self, row: RowReport) {
        self.total += 1;
        match row.outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Skipped => self.skipped += 1,
        }
        self.rows.push(row);
    }
}

/// Validate, enrich and upsert each row in input order.
///
/// A bad row is reported as skipped and never stops the batch. Rows
/// without coordinates are geocoded one at a time.
pub async fn run_import<I>(
    rows: I,
    store: &dyn CompetitionStore,
    geocoder: &dyn Geocoder,
    options: &ImportOptions,
) -> ImportReport
where
    I: IntoIterator,
    I::Item: Into<ImportRow>,
{
    let mut report = ImportReport::default();

    for (index, input) in rows.into_iter().enumerate() {
        let row = index + 1;

        let raw = match input.into() {
            ImportRow::Parsed(raw) => raw,
            ImportRow::Unreadable(reason) => {
                tracing::warn!(row, reason = %reason, "Skipping unreadable row");
                report.push(RowReport {
                    row,
                    slug: None,
                    outcome: RowOutcome::Skipped,
                    reason: Some(reason),
                    warnings: Vec::new(),
                });
                continue;
            }
        };

        let mut record = match validate(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row, field = e.field, reason = %e, "Skipping invalid row");
                report.push(RowReport {
                    row,
                    slug: None,
                    outcome: RowOutcome::Skipped,
                    reason: Some(e.to_string()),
                    warnings: Vec::new(),
                });
                continue;
            }
        };

        let mut warnings = Vec::new();

        if record.coordinates.is_none() {
            record.coordinates = geocoder.lookup(&record.location).await;

            if record.coordinates.is_none() {
                match options.fallback_coordinates {
                    Some(fallback) => {
                        record.coordinates = Some(fallback);
                        warnings.push(WARNING_FALLBACK_COORDINATES.to_string());
                    }
                    None => warnings.push(WARNING_NOT_GEOCODED.to_string()),
                }
            }
        }

        let outcome = match store.upsert_by_slug(&record).await {
            Ok(UpsertOutcome::Created) => RowOutcome::Created,
            Ok(UpsertOutcome::Updated {
                coordinates_cleared,
            }) => {
                if coordinates_cleared {
                    tracing::warn!(
                        row,
                        slug = %record.slug,
                        "Re-import removed previously stored coordinates"
                    );
                    warnings.push(WARNING_COORDINATES_CLEARED.to_string());
                }
                RowOutcome::Updated
            }
            Err(e) => {
                tracing::error!(row, slug = %record.slug, error = %e, "Failed to store row");
                report.push(RowReport {
                    row,
                    slug: Some(record.slug),
                    outcome: RowOutcome::Skipped,
                    reason: Some("could not be stored".to_string()),
                    warnings,
                });
                continue;
            }
        };

        tracing::info!(row, slug = %record.slug, ?outcome, "Imported row");
        report.push(RowReport {
            row,
            slug: Some(record.slug),
            outcome,
            reason: None,
            warnings,
        });
    }

    tracing::info!(
        total = report.total,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "Import finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::import::csv_format::read_records;
    use crate::import::geocoding::MockGeocoder;
    use crate::import::record::{CompetitionRecord, RawRecord};

    const ORGANIZER: &str = "6f1c2b4e-8d3a-4f5b-9c7d-1e2f3a4b5c6d";

    /// Keeps records by slug, mirroring the Postgres upsert rules
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<String, CompetitionRecord>>,
        fail_on: Option<String>,
    }

    impl MemoryStore {
        fn get(&self, slug: &str) -> Option<CompetitionRecord> {
            self.rows.lock().unwrap().get(slug).cloned()
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompetitionStore for MemoryStore {
        async fn upsert_by_slug(&self, record: &CompetitionRecord) -> AppResult<UpsertOutcome> {
            if self.fail_on.as_deref() == Some(record.slug.as_str()) {
                return Err(AppError::Database("connection reset".to_string()));
            }

            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&record.slug) {
                Some(existing) => {
                    let coordinates_cleared =
                        existing.coordinates.is_some() && record.coordinates.is_none();
                    let organizer_id = existing.organizer_id;
                    *existing = CompetitionRecord {
                        organizer_id,
                        ..record.clone()
                    };
                    Ok(UpsertOutcome::Updated {
                        coordinates_cleared,
                    })
                }
                None => {
                    rows.insert(record.slug.clone(), record.clone());
                    Ok(UpsertOutcome::Created)
                }
            }
        }
    }

    fn row(title: &str, location: &str, capacity: &str) -> RawRecord {
        [
            ("title", title),
            ("description", "Weekly freestyle jam"),
            ("date", "2025-03-01T20:00:00Z"),
            ("location", location),
            ("maxParticipants", capacity),
            ("organizerId", ORGANIZER),
        ]
        .into_iter()
        .collect()
    }

    fn palermo() -> Coordinates {
        Coordinates::new(-34.5889, -58.4245)
    }

    fn geocoder_finding_palermo() -> MockGeocoder {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_lookup()
            .returning(|location| (location.to_string() == "Palermo, CABA").then(palermo));
        geocoder
    }

    #[tokio::test]
    async fn test_open_mic_night_is_created_with_coordinates() {
        let store = MemoryStore::default();
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_lookup()
            .withf(|location| location.to_string() == "Palermo, CABA")
            .times(1)
            .returning(|_| Some(palermo()));

        let report = run_import(
            vec![row("Open Mic Night", "Palermo, CABA", "16")],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        assert_eq!((report.total, report.created), (1, 1));
        assert_eq!(report.rows[0].slug.as_deref(), Some("open-mic-night"));

        let stored = store.get("open-mic-night").unwrap();
        assert_eq!(stored.status, crate::models::CompetitionStatus::Open);
        assert_eq!(stored.coordinates, Some(palermo()));
    }

    #[tokio::test]
    async fn test_reimport_updates_capacity_without_duplicating() {
        let store = MemoryStore::default();
        let geocoder = geocoder_finding_palermo();
        let options = ImportOptions::default();

        run_import(
            vec![row("Open Mic Night", "Palermo, CABA", "16")],
            &store,
            &geocoder,
            &options,
        )
        .await;
        let report = run_import(
            vec![row("Open Mic Night", "Palermo, CABA", "24")],
            &store,
            &geocoder,
            &options,
        )
        .await;

        assert_eq!((report.created, report.updated), (0, 1));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("open-mic-night").unwrap().max_participants, 24);
    }

    #[tokio::test]
    async fn test_importing_twice_is_idempotent() {
        let store = MemoryStore::default();
        let geocoder = geocoder_finding_palermo();
        let rows = vec![
            row("Open Mic Night", "Palermo, CABA", "16"),
            row("Batalla del Parque", "Palermo, CABA", "32"),
            row("open  mic night", "Palermo, CABA", "16"),
        ];

        let first = run_import(rows.clone(), &store, &geocoder, &ImportOptions::default()).await;
        let second = run_import(rows, &store, &geocoder, &ImportOptions::default()).await;

        assert_eq!((first.created, first.updated), (2, 1));
        assert_eq!((second.created, second.updated), (0, 3));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_rows_are_skipped_and_the_batch_continues() {
        let store = MemoryStore::default();
        let geocoder = geocoder_finding_palermo();
        let mut missing_date = row("Sin Fecha", "Palermo, CABA", "16");
        missing_date.remove("date");

        let report = run_import(
            vec![
                missing_date,
                row("Too Big", "Palermo, CABA", "100"),
                row("Open Mic Night", "Palermo, CABA", "16"),
            ],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        assert_eq!((report.total, report.created, report.skipped), (3, 1, 2));
        assert_eq!(report.rows[0].outcome, RowOutcome::Skipped);
        assert_eq!(report.rows[0].reason.as_deref(), Some("date is required"));
        assert!(report.rows[1].reason.as_deref().unwrap().starts_with("maxParticipants"));
        assert_eq!(report.rows[2].row, 3);
        assert_eq!(report.rows[2].outcome, RowOutcome::Created);
    }

    #[tokio::test]
    async fn test_ungeocodable_location_is_still_persisted() {
        let store = MemoryStore::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_lookup().times(1).returning(|_| None);

        let report = run_import(
            vec![row("Open Mic Night", "Somewhere unknown", "16")],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        assert_eq!(report.created, 1);
        assert_eq!(report.rows[0].warnings, vec![WARNING_NOT_GEOCODED]);
        assert!(store.get("open-mic-night").unwrap().coordinates.is_none());
    }

    #[tokio::test]
    async fn test_fallback_coordinates_apply_only_when_lookup_fails() {
        let store = MemoryStore::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_lookup().returning(|_| None);
        let center = Coordinates::new(-34.6037, -58.3815);
        let options = ImportOptions {
            fallback_coordinates: Some(center),
        };

        let report = run_import(
            vec![row("Open Mic Night", "Somewhere unknown", "16")],
            &store,
            &geocoder,
            &options,
        )
        .await;

        assert_eq!(report.rows[0].warnings, vec![WARNING_FALLBACK_COORDINATES]);
        assert_eq!(store.get("open-mic-night").unwrap().coordinates, Some(center));
    }

    #[tokio::test]
    async fn test_rows_with_coordinates_skip_geocoding() {
        let store = MemoryStore::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_lookup().never();

        let mut located = row("Open Mic Night", "Palermo, CABA", "16");
        located.insert("latitude", "-34.58");
        located.insert("longitude", "-58.42");

        let report = run_import(vec![located], &store, &geocoder, &ImportOptions::default()).await;

        assert_eq!(report.created, 1);
        assert!(report.rows[0].warnings.is_empty());
    }

    #[tokio::test]
    async fn test_reimport_flags_cleared_coordinates() {
        let store = MemoryStore::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_lookup().returning(|_| None);

        let mut corrected = row("Open Mic Night", "Palermo, CABA", "16");
        corrected.insert("latitude", "-34.58");
        corrected.insert("longitude", "-58.42");
        run_import(vec![corrected], &store, &geocoder, &ImportOptions::default()).await;

        let report = run_import(
            vec![row("Open Mic Night", "Palermo, CABA", "16")],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        assert_eq!(report.updated, 1);
        assert!(report.rows[0]
            .warnings
            .contains(&WARNING_COORDINATES_CLEARED.to_string()));
        assert!(store.get("open-mic-night").unwrap().coordinates.is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_original_organizer() {
        let store = MemoryStore::default();
        let geocoder = geocoder_finding_palermo();
        run_import(
            vec![row("Open Mic Night", "Palermo, CABA", "16")],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        let mut takeover = row("Open Mic Night", "Palermo, CABA", "16");
        let intruder = Uuid::new_v4();
        takeover.insert("organizerId", intruder.to_string());
        run_import(vec![takeover], &store, &geocoder, &ImportOptions::default()).await;

        assert_eq!(
            store.get("open-mic-night").unwrap().organizer_id.to_string(),
            ORGANIZER
        );
    }

    #[tokio::test]
    async fn test_store_failure_skips_only_that_row() {
        let store = MemoryStore {
            fail_on: Some("open-mic-night".to_string()),
            ..Default::default()
        };
        let geocoder = geocoder_finding_palermo();

        let report = run_import(
            vec![
                row("Open Mic Night", "Palermo, CABA", "16"),
                row("Batalla del Parque", "Palermo, CABA", "32"),
            ],
            &store,
            &geocoder,
            &ImportOptions::default(),
        )
        .await;

        assert_eq!((report.created, report.skipped), (1, 1));
        assert_eq!(report.rows[0].reason.as_deref(), Some("could not be stored"));
        assert!(!report.rows[0].reason.as_deref().unwrap().contains("connection"));
    }

    #[tokio::test]
    async fn test_undecodable_csv_row_is_skipped_between_good_rows() {
        let store = MemoryStore::default();
        let geocoder = geocoder_finding_palermo();
        let mut file = b"title;description;date;location;maxParticipants;organizerId\n".to_vec();
        for title in [&b"Open Mic Night"[..], &b"Bad \xff Row"[..], &b"Batalla del Parque"[..]] {
            file.extend_from_slice(title);
            file.extend_from_slice(b";Weekly freestyle jam;2025-03-01T20:00:00Z;Palermo, CABA;16;");
            file.extend_from_slice(ORGANIZER.as_bytes());
            file.push(b'\n');
        }
        let (_, rows) = read_records(file.as_slice(), None).unwrap();

        let report = run_import(rows, &store, &geocoder, &ImportOptions::default()).await;

        assert_eq!((report.total, report.created, report.skipped), (3, 2, 1));
        assert_eq!(report.rows[1].outcome, RowOutcome::Skipped);
        assert_eq!(report.rows[1].reason.as_deref(), Some("row is not valid UTF-8"));
        assert_eq!(report.rows[2].row, 3);
        assert!(store.get("open-mic-night").is_some());
        assert!(store.get("batalla-del-parque").is_some());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut report = ImportReport::default();
        report.push(RowReport {
            row: 1,
            slug: Some("open-mic-night".to_string()),
            outcome: RowOutcome::Created,
            reason: None,
            warnings: Vec::new(),
        });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["created"], 1);
        assert_eq!(json["rows"][0]["outcome"], "CREATED");
        assert!(json["rows"][0].get("reason").is_none());
    }
}
