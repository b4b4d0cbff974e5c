use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use toybazaar_core::{AppConfig, ConfigError};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/toybazaar-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("document must be a JSON object")]
    InvalidDocument,
    #[error("invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Whether the failure comes from missing or unusable connection settings
    /// rather than from the store itself.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DbError::MissingDatabaseUrl
                | DbError::Config(_)
                | DbError::Sqlx(sqlx::Error::Configuration(_))
        )
    }
}

/// Database named by a Postgres connection string.
///
/// Understands the path form (`postgres://host/toybazaar`) and the `dbname`
/// query parameter. As with libpq, `PGDATABASE` fills in a missing name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for `DATABASE_URL` if the string is
/// not a valid connection URL.
pub fn database_name(database_url: &str) -> Result<Option<String>, ConfigError> {
    let options = PgConnectOptions::from_str(database_url)
        .map_err(|e| invalid_database_url(e.to_string()))?;
    Ok(options.get_database().map(ToOwned::to_owned))
}

/// Check that `database_url` parses and names a database.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for `DATABASE_URL` otherwise.
pub fn validate_database_url(database_url: &str) -> Result<(), ConfigError> {
    match database_name(database_url)? {
        Some(_) => Ok(()),
        None => Err(invalid_database_url(
            "connection string does not name a database".to_string(),
        )),
    }
}

fn invalid_database_url(reason: String) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: "DATABASE_URL".to_string(),
        reason,
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect to the Postgres pool described by `config`.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if no database URL is configured,
/// [`DbError::Config`] if it names no database, or [`DbError::Sqlx`] if the
/// connection cannot be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or(DbError::MissingDatabaseUrl)?;
    validate_database_url(database_url)?;
    connect_pool(database_url, PoolConfig::from_app_config(config))
        .await
        .map_err(DbError::from)
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; count that as zero.
    let applied_before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}


pub mod memory;
pub mod seed;
pub mod store;
pub mod toys;

pub use memory::MemoryStore;
pub use seed::seed_toys;
pub use store::ToyStore;
pub use toys::ToyRow;
