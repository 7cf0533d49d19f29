//! Raw row validation
//!
//! Turns an untyped key/value row (one CSV line or one JSON payload) into a
//! [`CompetitionRecord`]. Validation stops at the first failing field so a
//! batch can report exactly which column broke each skipped row.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::constants::{MAX_PARTICIPANTS, MAX_RATING, MIN_PARTICIPANTS, MIN_RATING};
use crate::models::{CompetitionStatus, Coordinates, Modality};

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordErrorKind {
    #[error("is required")]
    Missing,

    #[error("has an invalid value: {0}")]
    InvalidType(String),

    #[error("is out of range: {0}")]
    OutOfRange(String),
}

/// First invalid field of a raw record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {kind}")]
pub struct RecordError {
    pub field: &'static str,
    pub kind: RecordErrorKind,
}

impl RecordError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            kind: RecordErrorKind::Missing,
        }
    }

    fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            kind: RecordErrorKind::InvalidType(value.into()),
        }
    }

    fn out_of_range(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            kind: RecordErrorKind::OutOfRange(detail.into()),
        }
    }
}

/// One data row of an import file, as read
#[derive(Debug, Clone, PartialEq)]
pub enum ImportRow {
    Parsed(RawRecord),
    /// The row could not be decoded; holds the reason
    Unreadable(String),
}

impl From<RawRecord> for ImportRow {
    fn from(raw: RawRecord) -> Self {
        Self::Parsed(raw)
    }
}

/// Untyped key/value row, keyed by canonical column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Trimmed value of a column; blank cells count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Validated competition, ready to be upserted
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionRecord {
    pub slug: String,
    pub display_name: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub max_participants: i32,
    pub organizer_id: Uuid,
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
}

/// Validate a raw row, failing on the first bad field
pub fn validate(raw: &RawRecord) -> Result<CompetitionRecord, RecordError> {
    let title = required(raw, "title")?.to_string();
    let description = required(raw, "description")?.to_string();
    let raw_date = required(raw, "date")?;
    let date = parse_date(raw_date).ok_or_else(|| RecordError::invalid("date", raw_date))?;
    let location = required(raw, "location")?.to_string();
    let max_participants = parse_capacity(required(raw, "maxParticipants")?)?;
    let organizer_id = {
        let value = required(raw, "organizerId")?;
        Uuid::parse_str(value).map_err(|_| RecordError::invalid("organizerId", value))?
    };

    let status = match raw.get("status") {
        Some(value) => value
            .parse()
            .map_err(|_| RecordError::invalid("status", value))?,
        None => CompetitionStatus::default(),
    };
    let modality = match raw.get("modality") {
        Some(value) => value
            .parse()
            .map_err(|_| RecordError::invalid("modality", value))?,
        None => Modality::default(),
    };

    let slug = match raw.get("keyName") {
        Some(key) => slugify(key),
        None => slugify(&title),
    };
    if slug.is_empty() {
        let field = if raw.contains("keyName") { "keyName" } else { "title" };
        return Err(RecordError::invalid(field, "does not produce a usable slug"));
    }

    let rating = match raw.get("rating") {
        Some(value) => {
            let rating = parse_float("rating", value)?;
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(RecordError::out_of_range(
                    "rating",
                    format!("{} is not between {} and {}", rating, MIN_RATING, MAX_RATING),
                ));
            }
            Some(rating)
        }
        None => None,
    };

    let coordinates = parse_coordinates(raw)?;

    Ok(CompetitionRecord {
        slug,
        display_name: raw.get("displayName").unwrap_or(&title).to_string(),
        title,
        description,
        date,
        location,
        coordinates,
        max_participants,
        organizer_id,
        status,
        modality,
        image: optional(raw, "image"),
        rating,
        price: optional(raw, "price"),
        prize: optional(raw, "prize"),
        judges: raw.get("judges").map(split_list).unwrap_or_default(),
        hosts: raw.get("hosts").map(split_list).unwrap_or_default(),
        dj: optional(raw, "dj"),
        photographer: optional(raw, "photographer"),
    })
}

/// Derive a URL-safe key from a title.
///
/// Lower-cases, turns whitespace into hyphens, drops punctuation and
/// collapses repeated hyphens: `"Open Mic Night"` becomes `open-mic-night`.
pub fn slugify(input: &str) -> String {
    let mapped: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('-'),
            c if c.is_alphanumeric() || c == '-' => Some(c),
            _ => None,
        })
        .collect();

    mapped
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a comma-joined cell into trimmed, non-empty items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an instant. Accepts RFC 3339, naive date-times (taken as UTC)
/// and bare dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn required<'a>(raw: &'a RawRecord, field: &'static str) -> Result<&'a str, RecordError> {
    raw.get(field).ok_or_else(|| RecordError::missing(field))
}

fn optional(raw: &RawRecord, field: &str) -> Option<String> {
    raw.get(field).map(str::to_string)
}

fn parse_capacity(value: &str) -> Result<i32, RecordError> {
    let capacity: i32 = value
        .parse()
        .map_err(|_| RecordError::invalid("maxParticipants", value))?;

    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&capacity) {
        return Err(RecordError::out_of_range(
            "maxParticipants",
            format!(
                "{} is not between {} and {}",
                capacity, MIN_PARTICIPANTS, MAX_PARTICIPANTS
            ),
        ));
    }
    Ok(capacity)
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, RecordError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::invalid(field, value))
}

fn parse_coordinates(raw: &RawRecord) -> Result<Option<Coordinates>, RecordError> {
    let latitude = raw
        .get("latitude")
        .map(|v| parse_float("latitude", v))
        .transpose()?;
    let longitude = raw
        .get("longitude")
        .map(|v| parse_float("longitude", v))
        .transpose()?;

    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(RecordError::missing("longitude")),
        (None, Some(_)) => Err(RecordError::missing("latitude")),
        (Some(latitude), Some(longitude)) => {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(RecordError::out_of_range("latitude", latitude.to_string()));
            }
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(RecordError::out_of_range("longitude", longitude.to_string()));
            }
            Ok(Some(Coordinates::new(latitude, longitude)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORGANIZER: &str = "6f1c2b4e-8d3a-4f5b-9c7d-1e2f3a4b5c6d";

    fn open_mic_row() -> RawRecord {
        [
            ("title", "Open Mic Night"),
            ("description", "Weekly freestyle jam"),
            ("date", "2025-03-01T20:00:00Z"),
            ("location", "Palermo, CABA"),
            ("maxParticipants", "16"),
            ("organizerId", ORGANIZER),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_valid_row_gets_defaults() {
        let record = validate(&open_mic_row()).unwrap();

        assert_eq!(record.slug, "open-mic-night");
        assert_eq!(record.display_name, "Open Mic Night");
        assert_eq!(record.status, CompetitionStatus::Open);
        assert_eq!(record.modality, Modality::OneVsOne);
        assert_eq!(record.max_participants, 16);
        assert_eq!(record.organizer_id.to_string(), ORGANIZER);
        assert!(record.coordinates.is_none());
        assert!(record.judges.is_empty());
    }

    #[test]
    fn test_each_required_field_is_reported() {
        for field in [
            "title",
            "description",
            "date",
            "location",
            "maxParticipants",
            "organizerId",
        ] {
            let mut row = open_mic_row();
            row.remove(field);
            let err = validate(&row).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.kind, RecordErrorKind::Missing);
        }
    }

    #[test]
    fn test_blank_cell_counts_as_missing() {
        let mut row = open_mic_row();
        row.insert("location", "   ");
        assert_eq!(validate(&row).unwrap_err(), RecordError::missing("location"));
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut row = open_mic_row();
        row.insert("date", "next friday");
        row.insert("maxParticipants", "lots");

        let err = validate(&row).unwrap_err();
        assert_eq!(err.field, "date");
        assert!(matches!(err.kind, RecordErrorKind::InvalidType(_)));
    }

    #[test]
    fn test_capacity_type_and_range() {
        let mut row = open_mic_row();
        row.insert("maxParticipants", "sixteen");
        assert!(matches!(
            validate(&row).unwrap_err().kind,
            RecordErrorKind::InvalidType(_)
        ));

        row.insert("maxParticipants", "65");
        let err = validate(&row).unwrap_err();
        assert_eq!(err.field, "maxParticipants");
        assert!(matches!(err.kind, RecordErrorKind::OutOfRange(_)));

        row.insert("maxParticipants", "1");
        assert!(matches!(
            validate(&row).unwrap_err().kind,
            RecordErrorKind::OutOfRange(_)
        ));
    }

    #[test]
    fn test_organizer_must_be_an_id() {
        let mut row = open_mic_row();
        row.insert("organizerId", "org-1");
        let err = validate(&row).unwrap_err();
        assert_eq!(err.field, "organizerId");
        assert!(matches!(err.kind, RecordErrorKind::InvalidType(_)));
    }

    #[test]
    fn test_rating_is_parsed_not_defaulted() {
        let mut row = open_mic_row();
        row.insert("rating", "four");
        assert_eq!(validate(&row).unwrap_err().field, "rating");

        row.insert("rating", "5.5");
        assert!(matches!(
            validate(&row).unwrap_err().kind,
            RecordErrorKind::OutOfRange(_)
        ));

        row.insert("rating", "4.5");
        assert_eq!(validate(&row).unwrap().rating, Some(4.5));
    }

    #[test]
    fn test_coordinates_come_in_pairs() {
        let mut row = open_mic_row();
        row.insert("latitude", "-34.58");
        assert_eq!(validate(&row).unwrap_err(), RecordError::missing("longitude"));

        row.insert("longitude", "-58.42");
        let record = validate(&row).unwrap();
        assert_eq!(record.coordinates, Some(Coordinates::new(-34.58, -58.42)));

        row.insert("latitude", "-134.58");
        assert!(matches!(
            validate(&row).unwrap_err().kind,
            RecordErrorKind::OutOfRange(_)
        ));
    }

    #[test]
    fn test_explicit_key_name_overrides_title() {
        let mut row = open_mic_row();
        row.insert("keyName", "dinastiafreestyle");
        row.insert("displayName", "Dinastía Freestyle");

        let record = validate(&row).unwrap();
        assert_eq!(record.slug, "dinastiafreestyle");
        assert_eq!(record.display_name, "Dinastía Freestyle");
        assert_eq!(record.title, "Open Mic Night");
    }

    #[test]
    fn test_lists_are_split_and_trimmed() {
        let mut row = open_mic_row();
        row.insert("judges", "KIRO, DOSSANTOS,, CLAP ");
        row.insert("hosts", "");

        let record = validate(&row).unwrap();
        assert_eq!(record.judges, vec!["KIRO", "DOSSANTOS", "CLAP"]);
        assert!(record.hosts.is_empty());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Open Mic Night"), "open-mic-night");
        assert_eq!(slugify("  Rap  -  Battle!  "), "rap-battle");
        assert_eq!(slugify("Dinastía Freestyle"), "dinastía-freestyle");
        assert_eq!(slugify("¡¿?!"), "");
    }

    #[test]
    fn test_date_formats() {
        let expected = parse_date("2025-03-01T20:00:00Z").unwrap();
        assert_eq!(parse_date("2025-03-01T17:00:00-03:00"), Some(expected));
        assert_eq!(parse_date("2025-03-01 20:00:00"), Some(expected));
        assert_eq!(
            parse_date("2025-03-01").unwrap().to_rfc3339(),
            "2025-03-01T00:00:00+00:00"
        );
        assert!(parse_date("01/03/2025").is_none());
    }
}
