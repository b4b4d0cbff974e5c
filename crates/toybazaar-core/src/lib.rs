pub mod app_config;
pub mod catalog;
pub mod config;
pub mod contact;
pub mod lookup;
pub mod seed;
pub mod slug;
pub mod toys;
pub mod update;

pub use app_config::{AppConfig, Environment, StorageConfig, StoreBackend};
pub use catalog::{CatalogQuery, SortMode, CATALOG_LIMIT};
pub use config::{load_app_config, load_app_config_from_env};
pub use contact::build_whatsapp_link;
pub use lookup::{ItemKey, Lookup, Strategy, RESOLUTION_ORDER};
pub use seed::{load_toys, ToySeed, ToysFile};
pub use slug::slug_from_name;
pub use toys::{coerce_price, ToyDetail, ToySummary};
pub use update::{ToyUpdate, UpdateError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read toys file {path}: {source}")]
    ToysFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse toys file: {0}")]
    ToysFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
