//! Competition reconciliation pipeline
//!
//! CSV files and JSON payloads are validated into [`CompetitionRecord`]s,
//! enriched with coordinates by a [`Geocoder`] and upserted by slug into a
//! [`CompetitionStore`]. The pipeline itself is free of I/O; both seams are
//! traits so they can be swapped in tests.

pub mod csv_format;
pub mod geocoding;
pub mod pipeline;
pub mod record;
pub mod store;

pub use csv_format::{read_records, write_competitions, SchemaVersion, CANONICAL_COLUMNS};
pub use geocoding::{Geocoder, MapTilerGeocoder};
pub use pipeline::{run_import, ImportOptions, ImportReport, RowOutcome, RowReport};
pub use record::{slugify, validate, CompetitionRecord, ImportRow, RawRecord, RecordError, RecordErrorKind};
pub use store::{CompetitionStore, PgCompetitionStore, UpsertOutcome};
