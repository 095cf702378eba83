//! In-memory document backend.
//!
//! Documents are keyed by URL. Reads are public; writes and deletes require
//! an authenticated fetch capability, the way a pod guards its private space.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use podline_core::PodFetch;
use tokio::sync::RwLock;
use url::Url;

use crate::error::DatasetError;
use crate::model::Dataset;
use crate::traits::DatasetStore;

#[derive(Debug, Default)]
pub struct MemoryDatasetStore {
    documents: Arc<RwLock<HashMap<String, Dataset>>>,
    requests: AtomicUsize,
}

impl MemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without going through the credential checks.
    pub async fn insert(&self, url: &Url, dataset: Dataset) {
        self.documents
            .write()
            .await
            .insert(url.as_str().to_string(), dataset);
    }

    pub async fn get(&self, url: &Url) -> Option<Dataset> {
        self.documents.read().await.get(url.as_str()).cloned()
    }

    pub async fn contains(&self, url: &Url) -> bool {
        self.documents.read().await.contains_key(url.as_str())
    }

    /// Number of read/write/delete calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn require_credentials(url: &Url, fetch: &PodFetch) -> Result<(), DatasetError> {
        if fetch.is_authenticated() {
            Ok(())
        } else {
            Err(DatasetError::unauthorized(url.as_str(), 401))
        }
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn read_dataset(&self, url: &Url, _fetch: &PodFetch) -> Result<Dataset, DatasetError> {
        self.count();
        self.documents
            .read()
            .await
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| DatasetError::not_found(url.as_str()))
    }

    async fn write_dataset(
        &self,
        url: &Url,
        dataset: &Dataset,
        fetch: &PodFetch,
    ) -> Result<(), DatasetError> {
        self.count();
        Self::require_credentials(url, fetch)?;
        self.documents
            .write()
            .await
            .insert(url.as_str().to_string(), dataset.clone());
        Ok(())
    }

    async fn delete_dataset(&self, url: &Url, fetch: &PodFetch) -> Result<(), DatasetError> {
        self.count();
        Self::require_credentials(url, fetch)?;
        self.documents
            .write()
            .await
            .remove(url.as_str())
            .map(|_| ())
            .ok_or_else(|| DatasetError::not_found(url.as_str()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;

    fn url() -> Url {
        Url::parse("https://pod.example/doc").unwrap()
    }

    fn authed() -> PodFetch {
        PodFetch::with_bearer(reqwest::Client::new(), "t")
    }

    #[tokio::test]
    async fn write_read_delete() {
        let store = MemoryDatasetStore::new();
        let mut dataset = Dataset::new();
        dataset.set_entity(Entity::new("https://pod.example/doc#a"));

        store.write_dataset(&url(), &dataset, &authed()).await.unwrap();
        let read = store.read_dataset(&url(), &authed()).await.unwrap();
        assert_eq!(read, dataset);

        store.delete_dataset(&url(), &authed()).await.unwrap();
        let err = store.delete_dataset(&url(), &authed()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.request_count(), 4);
    }

    #[tokio::test]
    async fn writes_require_credentials() {
        let store = MemoryDatasetStore::new();
        let err = store
            .write_dataset(&url(), &Dataset::new(), &PodFetch::unauthenticated())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!store.contains(&url()).await);
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = MemoryDatasetStore::new();
        let err = store
            .read_dataset(&url(), &PodFetch::unauthenticated())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
