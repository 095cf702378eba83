//! Storage trait for pod documents.

use async_trait::async_trait;
use podline_core::PodFetch;
use url::Url;

use crate::error::DatasetError;
use crate::model::Dataset;

/// Contract every document backend implements.
///
/// Each call takes the fetch capability of the session on whose behalf it is
/// made, so a backend never holds credentials of its own. Implementations must
/// be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use podline_dataset::{DatasetStore, DatasetError};
///
/// async fn title(store: &dyn DatasetStore, url: &Url, fetch: &PodFetch) -> Result<Option<String>, DatasetError> {
///     let dataset = store.read_dataset(url, fetch).await?;
///     Ok(dataset.entities().find_map(|e| e.string(dcterms::TITLE).map(str::to_string)))
/// }
/// ```
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Reads the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::NotFound` if the document does not exist.
    /// Returns `DatasetError::Parse` if the body is not a readable dataset.
    async fn read_dataset(&self, url: &Url, fetch: &PodFetch) -> Result<Dataset, DatasetError>;

    /// Writes `dataset` to `url`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Unauthorized` if the credentials do not allow writing.
    async fn write_dataset(
        &self,
        url: &Url,
        dataset: &Dataset,
        fetch: &PodFetch,
    ) -> Result<(), DatasetError>;

    /// Deletes the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::NotFound` if there is nothing to delete.
    async fn delete_dataset(&self, url: &Url, fetch: &PodFetch) -> Result<(), DatasetError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
