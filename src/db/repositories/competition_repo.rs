//! Competition repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    import::CompetitionRecord,
    models::{Competition, CompetitionStatus},
};

/// Filters for listing and counting competitions
#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub status: Option<CompetitionStatus>,
    pub organizer_id: Option<Uuid>,
    /// Inclusive lower bound on the event date
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the event date
    pub until: Option<DateTime<Utc>>,
}

/// One page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Competition joined with its organizer's display name
#[derive(Debug, Clone, FromRow)]
pub struct CompetitionRow {
    #[sqlx(flatten)]
    pub competition: Competition,
    pub organizer_name: String,
}

/// Row returned by [`CompetitionRepository::upsert_by_slug`]
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedCompetition {
    #[sqlx(flatten)]
    pub competition: Competition,
    pub inserted: bool,
    pub coordinates_cleared: bool,
}

const FILTERED_WHERE: &str = r#"
    WHERE ($1::competition_status IS NULL OR c.status = $1)
      AND ($2::uuid IS NULL OR c.organizer_id = $2)
      AND ($3::timestamptz IS NULL OR c.date >= $3)
      AND ($4::timestamptz IS NULL OR c.date < $4)
"#;

/// Repository for competition database operations
pub struct CompetitionRepository;

impl CompetitionRepository {
    /// Insert a new competition; fails with a conflict if the slug exists
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        record: &CompetitionRecord,
    ) -> AppResult<Competition> {
        let (latitude, longitude) = split_coordinates(record);

        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (
                slug, display_name, title, description, date, location, latitude, longitude,
                max_participants, status, modality, image, rating, price, prize,
                judges, hosts, dj, photographer, organizer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(&record.slug)
        .bind(&record.display_name)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.date)
        .bind(&record.location)
        .bind(latitude)
        .bind(longitude)
        .bind(record.max_participants)
        .bind(record.status)
        .bind(record.modality)
        .bind(&record.image)
        .bind(record.rating)
        .bind(&record.price)
        .bind(&record.prize)
        .bind(&record.judges)
        .bind(&record.hosts)
        .bind(&record.dj)
        .bind(&record.photographer)
        .bind(record.organizer_id)
        .fetch_one(executor)
        .await?;

        Ok(competition)
    }

    /// Create or update a competition keyed by slug.
    ///
    /// An update rewrites every field except `organizer_id` and `created_at`.
    pub async fn upsert_by_slug<'e, E: PgExecutor<'e>>(
        executor: E,
        record: &CompetitionRecord,
    ) -> AppResult<UpsertedCompetition> {
        let (latitude, longitude) = split_coordinates(record);

        let row = sqlx::query_as::<_, UpsertedCompetition>(
            r#"
            WITH previous AS (
                SELECT latitude IS NOT NULL AS had_coordinates
                FROM competitions
                WHERE slug = $1
            )
            INSERT INTO competitions (
                slug, display_name, title, description, date, location, latitude, longitude,
                max_participants, status, modality, image, rating, price, prize,
                judges, hosts, dj, photographer, organizer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            ON CONFLICT (slug) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                date = EXCLUDED.date,
                location = EXCLUDED.location,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                max_participants = EXCLUDED.max_participants,
                status = EXCLUDED.status,
                modality = EXCLUDED.modality,
                image = EXCLUDED.image,
                rating = EXCLUDED.rating,
                price = EXCLUDED.price,
                prize = EXCLUDED.prize,
                judges = EXCLUDED.judges,
                hosts = EXCLUDED.hosts,
                dj = EXCLUDED.dj,
                photographer = EXCLUDED.photographer,
                updated_at = NOW()
            RETURNING competitions.*,
                (xmax = 0) AS inserted,
                (COALESCE((SELECT had_coordinates FROM previous), FALSE)
                    AND competitions.latitude IS NULL) AS coordinates_cleared
            "#,
        )
        .bind(&record.slug)
        .bind(&record.display_name)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.date)
        .bind(&record.location)
        .bind(latitude)
        .bind(longitude)
        .bind(record.max_participants)
        .bind(record.status)
        .bind(record.modality)
        .bind(&record.image)
        .bind(record.rating)
        .bind(&record.price)
        .bind(&record.prize)
        .bind(&record.judges)
        .bind(&record.hosts)
        .bind(&record.dj)
        .bind(&record.photographer)
        .bind(record.organizer_id)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Fetch a competition and hold its row lock until the transaction ends
    pub async fn lock_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: &Uuid,
    ) -> AppResult<Option<Competition>> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"SELECT * FROM competitions WHERE id = $1 FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(competition)
    }

    /// Find competition by slug, with organizer name
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> AppResult<Option<CompetitionRow>> {
        let row = sqlx::query_as::<_, CompetitionRow>(
            r#"
            SELECT c.*, u.name AS organizer_name
            FROM competitions c
            JOIN users u ON u.id = c.organizer_id
            WHERE c.slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// List competitions matching the filter, earliest first; every match
    /// when no page is given
    pub async fn list(
        pool: &PgPool,
        filter: &CompetitionFilter,
        page: Option<Page>,
    ) -> AppResult<Vec<CompetitionRow>> {
        let query = format!(
            r#"
            SELECT c.*, u.name AS organizer_name
            FROM competitions c
            JOIN users u ON u.id = c.organizer_id
            {}
            ORDER BY c.date ASC, c.slug ASC
            LIMIT $5 OFFSET $6
            "#,
            FILTERED_WHERE
        );

        let rows = sqlx::query_as::<_, CompetitionRow>(&query)
            .bind(filter.status)
            .bind(filter.organizer_id)
            .bind(filter.from)
            .bind(filter.until)
            .bind(page.map(|p| p.limit))
            .bind(page.map_or(0, |p| p.offset))
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Count competitions matching the filter
    pub async fn count(pool: &PgPool, filter: &CompetitionFilter) -> AppResult<i64> {
        let query = format!("SELECT COUNT(*) FROM competitions c {}", FILTERED_WHERE);

        let count: i64 = sqlx::query_scalar(&query)
            .bind(filter.status)
            .bind(filter.organizer_id)
            .bind(filter.from)
            .bind(filter.until)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Competitions that have coordinates, for the map
    pub async fn list_located(
        pool: &PgPool,
        status: Option<CompetitionStatus>,
    ) -> AppResult<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT * FROM competitions
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
              AND ($1::competition_status IS NULL OR status = $1)
            ORDER BY date ASC
            "#,
        )
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(competitions)
    }

    /// Every competition, for export
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Competition>> {
        let competitions =
            sqlx::query_as::<_, Competition>(r#"SELECT * FROM competitions ORDER BY date ASC, slug ASC"#)
                .fetch_all(pool)
                .await?;

        Ok(competitions)
    }
}

fn split_coordinates(record: &CompetitionRecord) -> (Option<f64>, Option<f64>) {
    match record.coordinates {
        Some(c) => (Some(c.latitude), Some(c.longitude)),
        None => (None, None),
    }
}
