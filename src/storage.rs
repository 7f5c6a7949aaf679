use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::errors::{UploadError, UploadResult};

/// Object-store collaborator. The uploader core only ever stores bytes under
/// a (container, key) pair and derives a public URL from the same pair.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> UploadResult<()>;

    fn public_url(&self, container: &str, key: &str) -> String;
}

/// HTTP object-store client speaking the storage API the admin panel's
/// backing service exposes: objects are created with
/// `POST {base}/object/{container}/{key}` and served from
/// `{base}/object/public/{container}/{key}`.
pub struct HttpObjectStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpObjectStore {
    pub fn new(config: &StorageConfig) -> UploadResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(UploadError::Config(
                "Object store base URL is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn object_url(&self, container: &str, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, container, key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> UploadResult<()> {
        let url = self.object_url(container, key);
        log::debug!("Uploading {} bytes to {}", bytes.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            log::debug!("Stored object {}/{}", container, key);
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::warn!(
            "Object store rejected {}/{} with status {}: {}",
            container,
            key,
            status,
            error_text
        );
        Err(UploadError::storage(status.as_u16(), &error_text))
    }

    fn public_url(&self, container: &str, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, container, key)
    }
}
