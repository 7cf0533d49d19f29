//! Rimappa competition importer
//!
//! Loads a competitions CSV (canonical or legacy schema) into the database
//! through the same reconciliation pipeline as the HTTP import, or exports
//! the stored competitions as canonical CSV.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use rimappa::{
    config::{DatabaseConfig, GeocodingConfig},
    constants::{CITY_CENTER_LATITUDE, CITY_CENTER_LONGITUDE},
    db::{self, repositories::CompetitionRepository},
    import::{self, ImportOptions, ImportRow, MapTilerGeocoder, PgCompetitionStore, SchemaVersion},
    models::Coordinates,
};

#[derive(Parser)]
#[command(name = "rimappa-import")]
#[command(about = "Rimappa competition CSV importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upsert every row of a CSV file, keyed by slug
    Import {
        #[arg(long)]
        file: PathBuf,

        /// Organizer assigned to legacy rows, which carry no organizerId
        #[arg(long)]
        organizer: Option<Uuid>,

        /// Place rows the geocoder cannot resolve at the Buenos Aires city center
        #[arg(long)]
        fallback_city_center: bool,

        /// Only parse and validate; nothing is geocoded or stored
        #[arg(long)]
        validate_only: bool,
    },
    /// Write every stored competition as canonical CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rimappa_import={},rimappa={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Import {
            file,
            organizer,
            fallback_city_center,
            validate_only,
        } => {
            handle_import(&file, organizer, fallback_city_center, validate_only).await?;
        }
        Commands::Export { out } => {
            handle_export(&out).await?;
        }
    }

    Ok(())
}

async fn handle_import(
    file: &Path,
    organizer: Option<Uuid>,
    fallback_city_center: bool,
    validate_only: bool,
) -> anyhow::Result<()> {
    tracing::info!("Loading competitions from: {}", file.display());
    let (version, rows) = load_records(file, organizer)?;
    tracing::info!(rows = rows.len(), schema = ?version, "CSV parsed");

    if validate_only {
        let invalid = count_invalid(&rows);
        tracing::info!(
            valid = rows.len() - invalid,
            invalid,
            "Validation finished"
        );
        if invalid > 0 {
            anyhow::bail!("{} row(s) failed validation", invalid);
        }
        return Ok(());
    }

    let database = DatabaseConfig::from_env()?;
    let geocoding = GeocodingConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database)
        .await
        .context("Could not connect to the database")?;
    db::run_migrations(&pool)
        .await
        .context("Database migrations failed")?;

    let geocoder =
        MapTilerGeocoder::new(&geocoding).context("Could not build the geocoding client")?;
    let store = PgCompetitionStore::new(pool);
    let options = ImportOptions {
        fallback_coordinates: fallback_city_center
            .then(|| Coordinates::new(CITY_CENTER_LATITUDE, CITY_CENTER_LONGITUDE)),
    };

    let report = import::run_import(rows, &store, &geocoder, &options).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn handle_export(out: &Path) -> anyhow::Result<()> {
    let database = DatabaseConfig::from_env()?;
    let pool = db::create_pool(&database)
        .await
        .context("Could not connect to the database")?;

    let competitions = CompetitionRepository::list_all(&pool).await?;

    let writer = BufWriter::new(
        File::create(out).with_context(|| format!("Could not create {}", out.display()))?,
    );
    import::write_competitions(writer, &competitions)?;

    tracing::info!(count = competitions.len(), "Exported to: {}", out.display());
    Ok(())
}

fn load_records(
    file: &Path,
    organizer: Option<Uuid>,
) -> anyhow::Result<(SchemaVersion, Vec<ImportRow>)> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Could not open {}", file.display()))?,
    );
    let parsed = import::read_records(reader, organizer)
        .with_context(|| format!("Malformed CSV file {}", file.display()))?;
    Ok(parsed)
}

/// Validate every row, logging the ones that fail
fn count_invalid(rows: &[ImportRow]) -> usize {
    rows.iter()
        .enumerate()
        .filter(|(index, row)| {
            let reason = match row {
                ImportRow::Parsed(raw) => match import::validate(raw) {
                    Ok(_) => return false,
                    Err(e) => e.to_string(),
                },
                ImportRow::Unreadable(reason) => reason.clone(),
            };
            tracing::warn!(row = index + 1, reason = %reason, "Invalid row");
            true
        })
        .count()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ORGANIZER: &str = "4f7c2a55-3f57-4d0b-9d41-2f3c61b2b7a1";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_canonical_file() {
        let file = write_csv(&format!(
            "title;description;date;location;maxParticipants;organizerId\n\
             Open Mic Night;Weekly freestyle jam;2025-06-01T20:00:00Z;Palermo, CABA;16;{}\n\
             ;missing title;2025-06-02;Palermo;16;{}\n",
            ORGANIZER, ORGANIZER
        ));

        let (version, rows) = load_records(file.path(), None).unwrap();
        assert_eq!(version, SchemaVersion::Canonical);
        assert_eq!(rows.len(), 2);
        assert_eq!(count_invalid(&rows), 1);
    }

    #[test]
    fn test_load_legacy_file_uses_organizer() {
        let file = write_csv(
            "displayName;keyName;eventDate;createdAt;modality;judges;location;price;description;flyerPath\n\
             Batalla del Sur;batalla-del-sur;2025-07-12;2025-01-01;ONE_VS_ONE;Juez A, Juez B;Lomas de Zamora;1500;Batalla anual del sur;\n",
        );
        let organizer: Uuid = ORGANIZER.parse().unwrap();

        let (version, rows) = load_records(file.path(), Some(organizer)).unwrap();
        assert_eq!(version, SchemaVersion::Legacy);
        assert_eq!(count_invalid(&rows), 0);

        let ImportRow::Parsed(raw) = &rows[0] else {
            panic!("legacy row should decode");
        };
        let record = import::validate(raw).unwrap();
        assert_eq!(record.organizer_id, organizer);
        assert_eq!(record.slug, "batalla-del-sur");
    }

    #[test]
    fn test_undecodable_row_counts_as_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"title;description;date;location;maxParticipants;organizerId\n")
            .unwrap();
        write!(
            file,
            "Open Mic Night;Weekly freestyle jam;2025-06-01T20:00:00Z;Palermo, CABA;16;{}\n",
            ORGANIZER
        )
        .unwrap();
        file.write_all(b"Bad \xff Row;Broken;2025-06-02T20:00:00Z;Palermo;16;x\n")
            .unwrap();

        let (_, rows) = load_records(file.path(), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(count_invalid(&rows), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_records(&dir.path().join("nope.csv"), None).is_err());
    }
}
