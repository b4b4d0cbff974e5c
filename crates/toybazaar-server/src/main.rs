mod api;
mod middleware;
mod resolver;

use toybazaar_core::{AppConfig, StoreBackend};
use toybazaar_db::{MemoryStore, ToyStore};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = toybazaar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = open_store(&config).await?;
    if config.contact_phone.is_none() {
        tracing::warn!("TOYBAZAAR_CONTACT_PHONE not set; contact links are disabled");
    }

    let app = build_app(AppState {
        store,
        contact_phone: config.contact_phone.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Postgres is migrated on startup; the memory store is filled from the seed file.
async fn open_store(config: &AppConfig) -> anyhow::Result<ToyStore> {
    match config.store {
        StoreBackend::Postgres => {
            let pool = toybazaar_db::connect_pool_from_config(config).await?;
            let applied = toybazaar_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations up to date");
            Ok(ToyStore::from(pool))
        }
        StoreBackend::Memory => {
            let store = ToyStore::from(MemoryStore::new());
            let toys = toybazaar_core::load_toys(&config.seed_path)?;
            let inserted = store.seed(&toys.toys).await?;
            tracing::info!(
                inserted,
                path = %config.seed_path.display(),
                "memory store seeded"
            );
            Ok(store)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
