//! Container (directory) helpers.

use podline_core::vocab::ldp;
use url::Url;

use crate::model::Dataset;

/// Members a container document lists through `ldp:contains`.
///
/// Statements about the container itself are looked up under its URL; an
/// unresolvable member IRI is skipped.
pub fn contained_resources(dataset: &Dataset, container: &Url) -> Vec<Url> {
    let Some(entity) = dataset.entity(container.as_str()) else {
        return Vec::new();
    };
    entity
        .iris(ldp::CONTAINS)
        .into_iter()
        .filter_map(|iri| container.join(iri).ok())
        .collect()
}
