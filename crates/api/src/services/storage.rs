//! Object storage client for product images.
//!
//! Uploads go to an external image-hosting service which assigns a stable
//! file id and a public URL; deletion is by file id. Objects are filed
//! under a configurable folder namespace. Calls complete (or fail) before
//! the enclosing HTTP response is produced - there is no deferred cleanup.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use crate::config::StorageConfig;
use crate::models::ImageRef;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur talking to the storage service.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("storage service returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Successful upload response from the storage service.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_id: String,
    url: String,
}

/// Client for the image-hosting service.
#[derive(Clone)]
pub struct ImageStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    folder: String,
}

impl ImageStore {
    /// Create a new storage client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            folder: config.folder.clone(),
        })
    }

    /// Upload an image and return its assigned file id and public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the
    /// upload.
    #[instrument(skip(self, bytes), fields(folder = %self.folder, size = bytes.len()))]
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageRef, StorageError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_owned())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/files", self.endpoint))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::debug!(file_id = %uploaded.file_id, "Image uploaded");

        Ok(ImageRef {
            file_id: uploaded.file_id,
            url: uploaded.url,
        })
    }

    /// Delete an object by its file id.
    ///
    /// A 404 from the service is treated as success: the object is already
    /// gone, which is all deletion promises.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the
    /// deletion.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_id: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(format!("{}/files", self.endpoint))
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("file_id", file_id)])
            .send()
            .await?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(Self::api_error(response).await)
    }

    async fn api_error(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StorageError::Api { status, message }
    }
}
