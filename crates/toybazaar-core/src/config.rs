use crate::app_config::{AppConfig, Environment, StorageConfig, StoreBackend};
use crate::ConfigError;

const STORAGE_VARS: [&str; 3] = [
    "TOYBAZAAR_STORAGE_REST_URL",
    "TOYBAZAAR_STORAGE_PUBLIC_URL",
    "TOYBAZAAR_STORAGE_API_KEY",
];

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let store = parse_store_backend(&or_default("TOYBAZAAR_STORE", "postgres"))?;

    let database_url = match store {
        StoreBackend::Postgres => Some(require("DATABASE_URL")?),
        StoreBackend::Memory => lookup("DATABASE_URL").ok(),
    };

    let env = parse_environment(&or_default("TOYBAZAAR_ENV", "development"))?;

    let bind_addr = or_default("TOYBAZAAR_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TOYBAZAAR_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TOYBAZAAR_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("TOYBAZAAR_SEED_PATH", "./config/toys.yaml"));
    let contact_phone = optional("TOYBAZAAR_CONTACT_PHONE");

    let db_max_connections = parse_u32("TOYBAZAAR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("TOYBAZAAR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TOYBAZAAR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let storage_values: Vec<Option<String>> = STORAGE_VARS.iter().map(|&v| optional(v)).collect();
    let storage = match storage_values.as_slice() {
        [Some(rest_url), Some(public_url), Some(api_key)] => Some(StorageConfig {
            rest_url: rest_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
            bucket: or_default("TOYBAZAAR_STORAGE_BUCKET", "toys"),
            request_timeout_secs: parse_u64("TOYBAZAAR_STORAGE_TIMEOUT_SECS", "30")?,
        }),
        [None, None, None] => None,
        _ => {
            return Err(ConfigError::Validation(format!(
                "object storage needs all of {} or none of them",
                STORAGE_VARS.join(", ")
            )))
        }
    };

    Ok(AppConfig {
        store,
        database_url,
        env,
        bind_addr,
        log_level,
        seed_path,
        contact_phone,
        storage,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOYBAZAAR_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_store_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    match s {
        "postgres" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOYBAZAAR_STORE".to_string(),
            reason: format!("expected postgres or memory; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
