//! HTTP client for the object-storage REST API.
//!
//! Uploads go to `<rest_url>/storage/v1/object/<bucket>/<name>` with the
//! service key sent both as a bearer token and as `apikey`. Uploaded objects
//! are served publicly from `<public_url>/<bucket>/<name>`.

use std::time::Duration;

use reqwest::{Client, Url};
use toybazaar_core::StorageConfig;

use crate::error::StorageError;

/// Client for uploading product images to a storage bucket.
///
/// Use [`StorageClient::new`] with the application's storage settings or
/// [`StorageClient::with_base_urls`] to point at a mock server in tests.
pub struct StorageClient {
    client: Client,
    api_key: String,
    bucket: String,
    rest_url: Url,
    public_url: String,
}

impl StorageClient {
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StorageError::InvalidUrl`] if the REST URL
    /// does not parse.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::with_base_urls(
            &config.rest_url,
            &config.public_url,
            &config.api_key,
            &config.bucket,
            config.request_timeout_secs,
        )
    }

    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StorageError::InvalidUrl`] if `rest_url`
    /// does not parse.
    pub fn with_base_urls(
        rest_url: &str,
        public_url: &str,
        api_key: &str,
        bucket: &str,
        timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("toybazaar/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", rest_url.trim_end_matches('/'));
        let rest_url = Url::parse(&normalised).map_err(|e| StorageError::InvalidUrl {
            url: rest_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            bucket: bucket.to_owned(),
            rest_url,
            public_url: public_url.trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL an object is served from once uploaded.
    #[must_use]
    pub fn public_url_for(&self, object_name: &str) -> String {
        format!("{}/{}/{object_name}", self.public_url, self.bucket)
    }

    fn upload_url(&self, object_name: &str) -> Result<Url, StorageError> {
        let path = format!("storage/v1/object/{}/{object_name}", self.bucket);
        self.rest_url
            .join(&path)
            .map_err(|e| StorageError::InvalidUrl {
                url: path,
                reason: e.to_string(),
            })
    }

    /// Uploads `bytes` as `object_name`, overwriting any existing object, and
    /// returns its public URL.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Http`] on network failure.
    /// - [`StorageError::Status`] if the API answers with a non-2xx status.
    /// - [`StorageError::InvalidUrl`] if the upload URL cannot be built.
    pub async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = self.upload_url(object_name)?;
        let size = bytes.len();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(object = object_name, bytes = size, "uploaded object");
        Ok(self.public_url_for(object_name))
    }
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("rest_url", &self.rest_url.as_str())
            .field("public_url", &self.public_url)
            .field("bucket", &self.bucket)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}
