//! Document round trips: write a fresh record to the pod, read records back.

use std::sync::Arc;

use podline_auth::Session;
use podline_core::vocab::dcterms;
use podline_core::{CoreError, Profile, Record, is_valid_fragment_id};
use podline_dataset::{Dataset, DatasetError, DynDatasetStore, Entity, contained_resources};
use url::Url;

use crate::log::ActivityLog;

/// File name of the demo document under the storage root.
pub const DEFAULT_DOCUMENT_NAME: &str = "podline-demo.jsonld";

pub const DEFAULT_RECORD_TITLE: &str = "some title";

/// Fallback storage root, relative to the WebID's origin.
pub const DEFAULT_PRIVATE_PATH: &str = "private/";

#[derive(Debug, thiserror::Error)]
pub enum RoundTripError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Invalid storage location: {0}")]
    InvalidStorage(String),

    #[error("Failed to build record: {0}")]
    Record(#[from] CoreError),

    #[error("Write failed: {0}")]
    Write(DatasetError),

    #[error("Read failed: {0}")]
    Read(DatasetError),
}

impl RoundTripError {
    #[must_use]
    pub fn invalid_storage(message: impl Into<String>) -> Self {
        Self::InvalidStorage(message.into())
    }
}

/// What happened to the previous version of a document before a write.
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing was there; expected on the first write.
    NotFound,
    /// Any other failure. The write still goes ahead.
    Failed(DatasetError),
}

impl DeleteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<Result<(), DatasetError>> for DeleteOutcome {
    fn from(result: Result<(), DatasetError>) -> Self {
        match result {
            Ok(()) => Self::Deleted,
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Result of [`RecordDocuments::create_and_store`].
#[derive(Debug)]
pub struct StoreReport {
    pub record: Record,
    pub delete: DeleteOutcome,
}

pub struct RecordDocuments {
    store: DynDatasetStore,
    log: Arc<dyn ActivityLog>,
    document_name: String,
    record_title: String,
    private_path: String,
}

impl RecordDocuments {
    pub fn new(store: DynDatasetStore, log: Arc<dyn ActivityLog>) -> Self {
        Self {
            store,
            log,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            record_title: DEFAULT_RECORD_TITLE.to_string(),
            private_path: DEFAULT_PRIVATE_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    #[must_use]
    pub fn with_record_title(mut self, title: impl Into<String>) -> Self {
        self.record_title = title.into();
        self
    }

    #[must_use]
    pub fn with_private_path(mut self, path: impl Into<String>) -> Self {
        self.private_path = path.into();
        self
    }

    /// The demo document under the profile's storage root.
    ///
    /// # Errors
    ///
    /// Returns `RoundTripError::InvalidStorage` when the profile has no
    /// storage, or the storage URL does not end with `/`.
    pub fn target_document_url(&self, profile: &Profile) -> Result<Url, RoundTripError> {
        let storage = profile
            .storage_location
            .as_ref()
            .ok_or_else(|| RoundTripError::invalid_storage("profile has no storage location"))?;
        self.document_in(storage)
    }

    /// `<scheme>://<host>[:port]/private/` of `web_id`, for profiles that do
    /// not advertise a storage root.
    pub fn fallback_storage_root(&self, web_id: &str) -> Result<Url, RoundTripError> {
        let url = Url::parse(web_id)
            .map_err(|e| RoundTripError::invalid_storage(format!("{web_id}: {e}")))?;
        if url.host_str().is_none() {
            return Err(RoundTripError::invalid_storage(format!("{web_id}: no host")));
        }
        let mut root = url;
        root.set_path(&format!("/{}", self.private_path));
        root.set_query(None);
        root.set_fragment(None);
        Ok(root)
    }

    /// The demo document under an explicit storage root.
    pub fn document_in(&self, storage: &Url) -> Result<Url, RoundTripError> {
        if !storage.path().ends_with('/') {
            return Err(RoundTripError::invalid_storage(format!(
                "{storage} does not end with '/'"
            )));
        }
        storage
            .join(&self.document_name)
            .map_err(|e| RoundTripError::invalid_storage(e.to_string()))
    }

    /// Replaces whatever is at `url` with a document holding one new record.
    ///
    /// A missing previous document is expected. Any other delete failure is
    /// logged and the write goes ahead. The write is not read back.
    ///
    /// # Errors
    ///
    /// Returns `RoundTripError::NotAuthenticated` without touching the pod if
    /// the session is not logged in, `RoundTripError::Write` if the write fails.
    pub async fn create_and_store(
        &self,
        session: &Session,
        url: &Url,
    ) -> Result<StoreReport, RoundTripError> {
        if !session.is_logged_in() {
            return Err(RoundTripError::NotAuthenticated);
        }

        let record = Record::new(&self.record_title);
        let dataset = record_dataset(url, &record)?;

        let delete = DeleteOutcome::from(self.store.delete_dataset(url, session.fetch()).await);
        match &delete {
            DeleteOutcome::Deleted => tracing::debug!(%url, "deleted previous document"),
            DeleteOutcome::NotFound => {}
            DeleteOutcome::Failed(e) => {
                tracing::warn!(%url, error = %e, "delete before write failed");
                self.log.error(&format!("could not delete {url}: {e}"));
            }
        }

        self.store
            .write_dataset(url, &dataset, session.fetch())
            .await
            .map_err(RoundTripError::Write)?;

        tracing::info!(%url, identifier = %record.identifier, "record stored");
        Ok(StoreReport { record, delete })
    }

    /// Reads every record in the document at `url`.
    ///
    /// On failure emits exactly one error line and returns an empty list.
    pub async fn fetch_and_list(&self, session: &Session, url: &Url) -> Vec<Record> {
        match self.try_fetch_and_list(session, url).await {
            Ok(records) => records,
            Err(e) => {
                self.log.error(&format!("error whilst getting: {e}"));
                Vec::new()
            }
        }
    }

    /// Like [`fetch_and_list`](Self::fetch_and_list), with the failure returned.
    ///
    /// Every entity yields a record, in document order. Missing titles or
    /// timestamps stay `None`.
    pub async fn try_fetch_and_list(
        &self,
        session: &Session,
        url: &Url,
    ) -> Result<Vec<Record>, RoundTripError> {
        if !session.is_logged_in() {
            return Err(RoundTripError::NotAuthenticated);
        }

        let dataset = self
            .store
            .read_dataset(url, session.fetch())
            .await
            .map_err(RoundTripError::Read)?;

        let records: Vec<Record> = dataset.entities().map(record_from_entity).collect();
        let partial = records.iter().filter(|r| r.is_partial()).count();
        if partial > 0 {
            tracing::debug!(%url, partial, "document holds partial records");
        }
        Ok(records)
    }

    /// Members of the container at `url`.
    pub async fn list_container(
        &self,
        session: &Session,
        url: &Url,
    ) -> Result<Vec<Url>, RoundTripError> {
        let dataset = self
            .store
            .read_dataset(url, session.fetch())
            .await
            .map_err(RoundTripError::Read)?;
        Ok(contained_resources(&dataset, url))
    }
}

/// One entity `<url>#<identifier>` with title and creation time.
fn record_dataset(url: &Url, record: &Record) -> Result<Dataset, CoreError> {
    if !is_valid_fragment_id(&record.identifier) {
        return Err(CoreError::invalid_iri(format!("{url}#{}", record.identifier)));
    }
    let mut id = url.clone();
    id.set_fragment(Some(&record.identifier));

    let mut entity = Entity::new(id.as_str());
    if let Some(title) = &record.title {
        entity.set_string(dcterms::TITLE, title);
    }
    if let Some(timestamp) = &record.timestamp {
        entity.set_datetime(dcterms::CREATED, timestamp)?;
    }

    let mut dataset = Dataset::new();
    dataset.set_entity(entity);
    Ok(dataset)
}

fn record_from_entity(entity: &Entity) -> Record {
    Record {
        identifier: entity.fragment().unwrap_or(entity.id()).to_string(),
        title: entity.string(dcterms::TITLE).map(str::to_string),
        timestamp: entity.datetime(dcterms::CREATED),
    }
}
