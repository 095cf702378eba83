//! IRIs of the vocabulary terms podline reads and writes.

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// vCard ontology, used by profile documents for the formatted name.
pub mod vcard {
    pub const FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
}

pub mod foaf {
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

/// Workspace ontology; `storage` points at the root of a user's pod.
pub mod pim {
    pub const STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";
}

pub mod ldp {
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
}

pub mod dcterms {
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
}
