use thiserror::Error;

/// Errors returned by the object-storage client.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage API answered with a non-2xx status.
    #[error("storage API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A configured base URL could not be parsed.
    #[error("invalid storage URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
