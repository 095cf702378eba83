//! Profile resolution.
//!
//! A WebID such as `https://alice.example/profile/card#me` names a subject
//! inside the profile document `https://alice.example/profile/card`. The
//! resolver reads that document with the session's credentials and projects
//! the subject's display name and storage root out of it.

use podline_auth::Session;
use podline_core::Profile;
use podline_core::vocab::{foaf, pim, vcard};
use podline_dataset::{DatasetError, DynDatasetStore};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The subject identifier is not an absolute URL.
    #[error("Invalid subject identifier {web_id}: {message}")]
    InvalidSubject { web_id: String, message: String },

    /// The profile document could not be fetched or parsed.
    #[error("Failed to fetch profile: {0}")]
    Fetch(#[from] DatasetError),
}

impl ProfileError {
    /// Returns `true` if the failure came from reading the document.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// Address of the document describing `web_id`: the same URL, fragment removed.
pub fn profile_document_url(web_id: &str) -> Result<Url, ProfileError> {
    let mut url = subject_url(web_id)?;
    url.set_fragment(None);
    Ok(url)
}

fn subject_url(web_id: &str) -> Result<Url, ProfileError> {
    Url::parse(web_id).map_err(|e| ProfileError::InvalidSubject {
        web_id: web_id.to_string(),
        message: e.to_string(),
    })
}

pub struct ProfileResolver {
    store: DynDatasetStore,
}

impl ProfileResolver {
    pub fn new(store: DynDatasetStore) -> Self {
        Self { store }
    }

    /// Resolves the profile of the session's subject.
    ///
    /// A logged-out session, or one without a subject, resolves to an empty
    /// profile without any request. So does a profile document that does not
    /// describe the subject.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Fetch` if the profile document cannot be read;
    /// that is never reported as an empty profile.
    pub async fn resolve(&self, session: &Session) -> Result<Profile, ProfileError> {
        let Some(web_id) = session.subject_id().filter(|_| session.is_logged_in()) else {
            return Ok(Profile::default());
        };

        let document = profile_document_url(web_id)?;
        tracing::debug!(%document, backend = self.store.backend_name(), "reading profile");
        let dataset = self.store.read_dataset(&document, session.fetch()).await?;

        // Identifiers in the dataset are in parsed URL form, so `https://host#me`
        // is stored as `https://host/#me`.
        let subject_key = subject_url(web_id)?;
        let Some(subject) = dataset
            .entity(web_id)
            .or_else(|| dataset.entity(subject_key.as_str()))
        else {
            tracing::debug!(web_id, "profile document does not describe the subject");
            return Ok(Profile::default());
        };

        let display_name = subject
            .string(vcard::FN)
            .or_else(|| subject.string(foaf::NAME))
            .map(str::to_string);
        let storage_location = subject.iri(pim::STORAGE).and_then(|iri| {
            Url::parse(iri)
                .inspect_err(|e| tracing::warn!(iri, error = %e, "ignoring unusable storage IRI"))
                .ok()
        });

        Ok(Profile {
            display_name,
            storage_location,
        })
    }
}
