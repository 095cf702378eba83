//! HTTP document backend talking to a pod server.

use async_trait::async_trait;
use podline_core::PodFetch;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::error::DatasetError;
use crate::jsonld;
use crate::model::Dataset;
use crate::traits::DatasetStore;

/// Default cap on document bodies (4 MB).
const DEFAULT_MAX_DOCUMENT_SIZE: usize = 4 * 1024 * 1024;

/// Reads and writes documents as JSON-LD over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDatasetStore {
    max_document_size: usize,
}

impl Default for HttpDatasetStore {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl HttpDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn exceeds_limit(&self, len: u64) -> bool {
        usize::try_from(len).map_or(true, |len| len > self.max_document_size)
    }

    /// Sets the maximum accepted document size in bytes.
    #[must_use]
    pub fn with_max_document_size(mut self, size: usize) -> Self {
        self.max_document_size = size;
        self
    }
}

#[async_trait]
impl DatasetStore for HttpDatasetStore {
    async fn read_dataset(&self, url: &Url, fetch: &PodFetch) -> Result<Dataset, DatasetError> {
        debug!(url = %url, authenticated = fetch.is_authenticated(), "GET dataset");
        let resp = fetch
            .request(Method::GET, url)
            .header(ACCEPT, jsonld::MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| DatasetError::network(url.as_str(), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DatasetError::from_status(url.as_str(), status.as_u16(), body));
        }

        if resp.content_length().is_some_and(|len| self.exceeds_limit(len)) {
            return Err(DatasetError::parse(
                url.as_str(),
                format!("document exceeds {} bytes", self.max_document_size),
            ));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DatasetError::network(url.as_str(), e.to_string()))?;
        if bytes.len() > self.max_document_size {
            return Err(DatasetError::parse(
                url.as_str(),
                format!("document exceeds {} bytes", self.max_document_size),
            ));
        }

        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| DatasetError::parse(url.as_str(), e.to_string()))?;
        jsonld::decode(&document, url)
    }

    async fn write_dataset(
        &self,
        url: &Url,
        dataset: &Dataset,
        fetch: &PodFetch,
    ) -> Result<(), DatasetError> {
        let body = serde_json::to_vec(&jsonld::encode(dataset))
            .map_err(|e| DatasetError::serialize(e.to_string()))?;
        debug!(url = %url, entities = dataset.len(), bytes = body.len(), "PUT dataset");

        let resp = fetch
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, jsonld::MEDIA_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| DatasetError::network(url.as_str(), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DatasetError::from_status(url.as_str(), status.as_u16(), body));
        }
        Ok(())
    }

    async fn delete_dataset(&self, url: &Url, fetch: &PodFetch) -> Result<(), DatasetError> {
        debug!(url = %url, "DELETE dataset");
        let resp = fetch
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|e| DatasetError::network(url.as_str(), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DatasetError::from_status(url.as_str(), status.as_u16(), body));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
