/// Database migration runner
///
/// Migrations live in `eduagent-shared/migrations/` and are embedded into the
/// binary at compile time, so a deployed server carries its own schema.
///
/// # Example
///
/// ```no_run
/// use eduagent_shared::db::pool::{create_pool, DatabaseConfig};
/// use eduagent_shared::db::migrations::{run_migrations, get_migration_status};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// run_migrations(&pool).await?;
/// let status = get_migration_status(&pool).await?;
/// println!("Applied {} migrations", status.applied_migrations);
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    postgres::PgPool,
    Postgres,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Embedded migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Number of migrations embedded in this build
    pub known_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

impl MigrationStatus {
    /// Whether every embedded migration has been applied
    pub fn is_up_to_date(&self) -> bool {
        self.applied_migrations >= self.known_migrations
    }
}

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails or the connection drops mid-run
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Runs migrations, retrying until the database accepts them
///
/// For a server that started while the database was down. `max_attempts` of
/// `None` keeps retrying forever.
///
/// # Errors
///
/// Returns the last migration error once `max_attempts` is exhausted
pub async fn run_migrations_with_retry(
    pool: &PgPool,
    retry_interval: Duration,
    max_attempts: Option<u32>,
) -> Result<(), sqlx::migrate::MigrateError> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match run_migrations(pool).await {
            Ok(()) => return Ok(()),
            Err(e) if max_attempts.is_some_and(|max| attempt >= max) => return Err(e),
            Err(e) => {
                warn!(
                    attempt,
                    error = %e,
                    retry_in_ms = retry_interval.as_millis() as u64,
                    "Migrations not applied yet, retrying"
                );
                tokio::time::sleep(retry_interval).await;
            }
        }
    }
}

/// Reads the applied-migration bookkeeping table
///
/// # Errors
///
/// Returns an error if the bookkeeping table cannot be queried
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let known_migrations = MIGRATOR.iter().count();

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            known_migrations,
            latest_version: None,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: usize::try_from(count).unwrap_or(0),
        known_migrations,
        latest_version,
    })
}

/// Creates the database if it doesn't exist (development and tests)
///
/// # Errors
///
/// Returns an error if the server is unreachable or creation is refused
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
