//! Database command handlers for the CLI.
//!
//! All of them talk to Postgres directly, whatever `TOYBAZAAR_STORE` says.

use std::path::Path;

use toybazaar_core::AppConfig;
use toybazaar_db::ToyStore;

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = toybazaar_db::connect_pool_from_config(config).await?;
    let applied = toybazaar_db::run_migrations(&pool).await?;
    println!("migrations applied: {applied}");
    Ok(())
}

pub(crate) async fn run_ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = toybazaar_db::connect_pool_from_config(config).await?;
    toybazaar_db::ping(&pool).await?;
    println!("database ok");
    Ok(())
}

/// Seed products from `path`, or from the configured seed file.
///
/// Products whose slug is already stored are skipped, so repeated runs are
/// harmless.
///
/// # Errors
///
/// Returns an error if the seed file is unreadable or invalid, or if the
/// database rejects an insert (the whole batch is rolled back).
pub(crate) async fn run_seed(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.unwrap_or(config.seed_path.as_path());
    let toys = toybazaar_core::load_toys(path)?;

    let pool = toybazaar_db::connect_pool_from_config(config).await?;
    let store = ToyStore::from(pool);
    let inserted = store.seed(&toys.toys).await?;

    tracing::info!(path = %path.display(), inserted, "seed complete");
    println!(
        "seeded {inserted} of {} products from {}",
        toys.toys.len(),
        path.display()
    );
    Ok(())
}
