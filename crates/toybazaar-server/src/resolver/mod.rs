//! Catalog and item resolution over the document store.
//!
//! Resolvers hold the request semantics (fallback order, validation, the
//! popularity side effect) and know nothing about HTTP. Handlers in
//! [`crate::api`] map [`ResolveError`] onto status codes.

pub mod catalog;
pub mod item;

use thiserror::Error;
use toybazaar_db::DbError;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Required external configuration is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed identifier or request body. The message is user-facing.
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("not found")]
    NotFound,

    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),
}

impl From<DbError> for ResolveError {
    fn from(error: DbError) -> Self {
        if error.is_configuration() {
            ResolveError::Configuration(error.to_string())
        } else {
            ResolveError::StoreUnavailable(error)
        }
    }
}
