//! Semicolon-delimited competition files
//!
//! Version 2 is the canonical column set, written by export and expected
//! by import. Version 1 files (the first import script's format) are
//! detected by their header and normalised into version 2 rows.

use std::io::{Read, Write};

use chrono::SecondsFormat;
use csv::{ByteRecord, ReaderBuilder, StringRecord, WriterBuilder};
use uuid::Uuid;

use crate::constants::{CSV_DELIMITER, LEGACY_DEFAULT_MAX_PARTICIPANTS};
use crate::models::Competition;

use super::record::{slugify, ImportRow, RawRecord};

/// Column order written by export
pub const CANONICAL_COLUMNS: [&str; 20] = [
    "title",
    "description",
    "date",
    "location",
    "maxParticipants",
    "organizerId",
    "status",
    "modality",
    "keyName",
    "displayName",
    "image",
    "rating",
    "price",
    "prize",
    "judges",
    "hosts",
    "dj",
    "photographer",
    "latitude",
    "longitude",
];

/// Header layout of an import file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// `displayName; keyName; eventDate; createdAt; modality; judges; location; price; description; flyerPath`
    Legacy,
    Canonical,
}

impl SchemaVersion {
    pub fn detect(headers: &StringRecord) -> Self {
        let has = |name: &str| headers.iter().any(|h| h.trim() == name);

        if has("eventDate") && has("displayName") && !has("title") {
            Self::Legacy
        } else {
            Self::Canonical
        }
    }
}

/// Read every data row of a file.
///
/// `operator` fills the organizer of legacy rows, which carry none. A row
/// that is not valid UTF-8 comes back as [`ImportRow::Unreadable`] and the
/// rows after it are still read; only an unreadable header or an I/O
/// failure fails the whole file.
pub fn read_records<R: Read>(
    reader: R,
    operator: Option<Uuid>,
) -> Result<(SchemaVersion, Vec<ImportRow>), csv::Error> {
    let mut reader = ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let version = SchemaVersion::detect(&headers);

    let mut rows = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        let Some(mut record) = decode_row(&headers, &row) else {
            let line = row.position().map_or(0, |p| p.line());
            tracing::warn!(line, "Row is not valid UTF-8");
            rows.push(ImportRow::Unreadable("row is not valid UTF-8".to_string()));
            continue;
        };

        if version == SchemaVersion::Legacy {
            record = normalize_legacy(record, operator);
        }
        rows.push(ImportRow::Parsed(record));
    }

    Ok((version, rows))
}

fn decode_row(headers: &StringRecord, row: &ByteRecord) -> Option<RawRecord> {
    headers
        .iter()
        .zip(row.iter())
        .map(|(header, value)| {
            std::str::from_utf8(value)
                .ok()
                .map(|value| (header.trim(), value))
        })
        .collect::<Option<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

/// Map a version 1 row onto version 2 columns
fn normalize_legacy(mut legacy: RawRecord, operator: Option<Uuid>) -> RawRecord {
    let display_name = legacy.remove("displayName").unwrap_or_default();
    let mut record = RawRecord::new();

    for column in ["description", "location", "modality", "judges", "price", "keyName"] {
        if let Some(value) = legacy.remove(column) {
            record.insert(column, value);
        }
    }

    if let Some(date) = legacy.remove("eventDate") {
        record.insert("date", date);
    }

    let slug = match record.get("keyName") {
        Some(key) => slugify(key),
        None => slugify(&display_name),
    };
    let flyer = legacy
        .remove("flyerPath")
        .filter(|path| !path.trim().is_empty());
    match flyer {
        Some(path) => record.insert("image", path),
        None if !slug.is_empty() => {
            record.insert("image", format!("/images/competitions/flyers/{}.jpg", slug))
        }
        None => {}
    }

    record.insert("title", display_name.clone());
    record.insert("displayName", display_name);
    record.insert("maxParticipants", LEGACY_DEFAULT_MAX_PARTICIPANTS.to_string());
    if let Some(organizer) = operator {
        record.insert("organizerId", organizer.to_string());
    }

    record
}

/// Write competitions in the canonical column order
pub fn write_competitions<W: Write>(
    writer: W,
    competitions: &[Competition],
) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(writer);

    writer.write_record(CANONICAL_COLUMNS)?;

    let optional_float = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();

    for c in competitions {
        writer.write_record([
            c.title.clone(),
            c.description.clone(),
            c.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            c.location.clone(),
            c.max_participants.to_string(),
            c.organizer_id.to_string(),
            c.status.to_string(),
            c.modality.to_string(),
            c.slug.clone(),
            c.display_name.clone(),
            c.image.clone().unwrap_or_default(),
            optional_float(c.rating),
            c.price.clone().unwrap_or_default(),
            c.prize.clone().unwrap_or_default(),
            c.judges.join(", "),
            c.hosts.join(", "),
            c.dj.clone().unwrap_or_default(),
            c.photographer.clone().unwrap_or_default(),
            optional_float(c.latitude),
            optional_float(c.longitude),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
