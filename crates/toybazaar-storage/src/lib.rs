//! Object-storage client for product images.

pub mod client;
pub mod error;
pub mod object;

pub use client::StorageClient;
pub use error::StorageError;
pub use object::{content_type_for, object_name_for};
