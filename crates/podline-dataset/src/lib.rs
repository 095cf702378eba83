//! # podline-dataset
//!
//! Dataset model and document storage for podline.
//!
//! ## Overview
//!
//! - [`Dataset`], [`Entity`], [`Term`] - the in-memory model of one document
//! - [`DatasetStore`] - contract for reading, writing and deleting documents
//! - [`HttpDatasetStore`] - talks JSON-LD to a pod server
//! - [`MemoryDatasetStore`] - keeps documents in process
//!
//! ## Example
//!
//! ```ignore
//! use podline_dataset::{Dataset, DatasetStore, Entity, HttpDatasetStore};
//!
//! let mut entity = Entity::new(format!("{url}#note"));
//! entity.set_string(dcterms::TITLE, "hello");
//! let mut dataset = Dataset::new();
//! dataset.set_entity(entity);
//!
//! HttpDatasetStore::new().write_dataset(&url, &dataset, session.fetch()).await?;
//! ```

pub mod container;
mod error;
pub mod http;
pub mod jsonld;
pub mod memory;
mod model;
mod traits;

pub use container::contained_resources;
pub use error::{DatasetError, ErrorCategory};
pub use http::HttpDatasetStore;
pub use memory::MemoryDatasetStore;
pub use model::{Dataset, Entity, Literal, Term};
pub use traits::DatasetStore;

/// Type alias for a dataset result.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Type alias for a shared dataset backend.
pub type DynDatasetStore = std::sync::Arc<dyn DatasetStore>;
