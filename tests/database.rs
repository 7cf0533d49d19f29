//! Database-backed tests against a throwaway PostgreSQL container.
//!
//! Run with `cargo test -- --ignored` on a machine with a Docker daemon.

use async_trait::async_trait;
use futures::future::join_all;
use sqlx::{postgres::PgPoolOptions, PgPool};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

use rimappa::{
    db::{
        self,
        repositories::{CompetitionRepository, ParticipationRepository, UserRepository},
    },
    error::AppError,
    import::{
        self, pipeline::WARNING_COORDINATES_CLEARED, Geocoder, ImportOptions, PgCompetitionStore,
        RawRecord, RowOutcome,
    },
    middleware::AuthenticatedUser,
    models::{Competition, Coordinates, UserRole},
    services::ParticipationService,
};

/// Geocoder that never finds anything
struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn lookup(&self, _location: &str) -> Option<Coordinates> {
        None
    }
}

/// Start a container and return a migrated pool; keep the container alive
async fn setup() -> (ContainerAsync<Postgres>, PgPool) {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    (container, pool)
}

async fn create_user(pool: &PgPool, name: &str, role: UserRole) -> AuthenticatedUser {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let user = UserRepository::create(pool, name, &email, "not-a-real-hash", role)
        .await
        .unwrap();

    AuthenticatedUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }
}

fn row(organizer: Uuid, capacity: &str) -> RawRecord {
    RawRecord::from_iter([
        ("title", "Open Mic Night"),
        ("description", "Weekly freestyle jam"),
        ("date", "2030-06-01T20:00:00Z"),
        ("location", "Palermo, CABA"),
        ("maxParticipants", capacity),
        ("organizerId", organizer.to_string().as_str()),
    ])
}

async fn create_competition(pool: &PgPool, organizer: Uuid, capacity: &str) -> Competition {
    let record = import::validate(&row(organizer, capacity)).unwrap();
    CompetitionRepository::insert(pool, &record).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires a Docker daemon"]
async fn test_only_one_request_gets_the_last_seat() {
    let (_container, pool) = setup().await;

    let organizer = create_user(&pool, "Organizer", UserRole::Organizer).await;
    let first = create_user(&pool, "First MC", UserRole::Competitor).await;

    let competition = create_competition(&pool, organizer.id, "2").await;
    ParticipationService::request(&pool, &first, &competition.id)
        .await
        .unwrap();

    let mut contenders = Vec::new();
    for n in 0..4 {
        contenders.push(create_user(&pool, &format!("Contender {}", n), UserRole::Competitor).await);
    }

    let results = join_all(
        contenders
            .iter()
            .map(|user| ParticipationService::request(&pool, user, &competition.id)),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppError::Conflict(_))));

    let seats = ParticipationRepository::count_seats(&pool, &competition.id)
        .await
        .unwrap();
    assert_eq!(seats, 2);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_duplicate_request_is_refused() {
    let (_container, pool) = setup().await;

    let organizer = create_user(&pool, "Organizer", UserRole::Organizer).await;
    let competitor = create_user(&pool, "Solo MC", UserRole::Competitor).await;
    let competition = create_competition(&pool, organizer.id, "16").await;

    ParticipationService::request(&pool, &competitor, &competition.id)
        .await
        .unwrap();
    let again = ParticipationService::request(&pool, &competitor, &competition.id).await;

    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_reimport_updates_without_duplicates_and_keeps_organizer() {
    let (_container, pool) = setup().await;

    let organizer = create_user(&pool, "Organizer", UserRole::Organizer).await;
    let other = create_user(&pool, "Other Organizer", UserRole::Organizer).await;
    let store = PgCompetitionStore::new(pool.clone());
    let options = ImportOptions::default();

    let mut first = row(organizer.id, "16");
    first.insert("latitude", "-34.5875");
    first.insert("longitude", "-58.4205");
    let report = import::run_import(vec![first], &store, &NoGeocoder, &options).await;
    assert_eq!(report.created, 1);

    let second = row(other.id, "24");
    let report = import::run_import(vec![second], &store, &NoGeocoder, &options).await;
    assert_eq!(report.updated, 1);
    assert_eq!(report.rows[0].outcome, RowOutcome::Updated);
    assert!(report.rows[0]
        .warnings
        .iter()
        .any(|w| w == WARNING_COORDINATES_CLEARED));

    let stored = CompetitionRepository::list_all(&pool).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].slug, "open-mic-night");
    assert_eq!(stored[0].max_participants, 24);
    assert_eq!(stored[0].organizer_id, organizer.id);
    assert!(stored[0].coordinates().is_none());

    let created_events: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activities WHERE type = 'COMPETITION_CREATED'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(created_events, 1);
}
