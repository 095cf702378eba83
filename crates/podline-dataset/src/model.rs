//! In-memory dataset model.
//!
//! A [`Dataset`] is an ordered collection of [`Entity`] values keyed by their
//! identifier. Each entity maps predicate IRIs to one or more [`Term`]s.
//! Insertion order is preserved so a dataset read from a document enumerates
//! entities in the order the document listed them.

use indexmap::IndexMap;
use podline_core::time::PodDateTime;
use podline_core::vocab::xsd;
use podline_core::CoreError;
use std::str::FromStr;

/// Literal value with optional datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    fn is_string(&self) -> bool {
        match self.datatype.as_deref() {
            None => true,
            Some(dt) => dt == xsd::STRING,
        }
    }
}

/// Object of a statement: either a resource reference or a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            Self::Iri(_) => None,
        }
    }
}

/// A single addressable subject within a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    id: String,
    properties: IndexMap<String, Vec<Term>>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fragment of the identifier, if it has one.
    pub fn fragment(&self) -> Option<&str> {
        self.id.split_once('#').map(|(_, frag)| frag)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates over `(predicate, values)` pairs in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[Term])> {
        self.properties.iter().map(|(p, v)| (p.as_str(), v.as_slice()))
    }

    pub fn values(&self, predicate: &str) -> &[Term] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends a value for `predicate`, keeping existing values.
    pub fn add(&mut self, predicate: impl Into<String>, term: Term) -> &mut Self {
        self.properties.entry(predicate.into()).or_default().push(term);
        self
    }

    /// Replaces every value of `predicate` with `term`.
    pub fn set(&mut self, predicate: impl Into<String>, term: Term) -> &mut Self {
        self.properties.insert(predicate.into(), vec![term]);
        self
    }

    pub fn set_string(&mut self, predicate: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(predicate, Term::Literal(Literal::plain(value)))
    }

    pub fn set_datetime(
        &mut self,
        predicate: impl Into<String>,
        value: &PodDateTime,
    ) -> Result<&mut Self, CoreError> {
        let lexical = value.to_lexical()?;
        Ok(self.set(predicate, Term::Literal(Literal::typed(lexical, xsd::DATE_TIME))))
    }

    pub fn set_iri(&mut self, predicate: impl Into<String>, iri: impl Into<String>) -> &mut Self {
        self.set(predicate, Term::Iri(iri.into()))
    }

    /// First string literal (untyped or `xsd:string`) of `predicate`.
    pub fn string(&self, predicate: &str) -> Option<&str> {
        self.values(predicate)
            .iter()
            .filter_map(Term::as_literal)
            .find(|lit| lit.is_string())
            .map(|lit| lit.value.as_str())
    }

    /// First `xsd:dateTime` literal of `predicate` that parses.
    pub fn datetime(&self, predicate: &str) -> Option<PodDateTime> {
        self.values(predicate)
            .iter()
            .filter_map(Term::as_literal)
            .filter(|lit| lit.datatype.as_deref() == Some(xsd::DATE_TIME))
            .find_map(|lit| PodDateTime::from_str(&lit.value).ok())
    }

    /// First IRI value of `predicate`.
    pub fn iri(&self, predicate: &str) -> Option<&str> {
        self.values(predicate).iter().find_map(Term::as_iri)
    }

    /// Every IRI value of `predicate`.
    pub fn iris(&self, predicate: &str) -> Vec<&str> {
        self.values(predicate)
            .iter()
            .filter_map(Term::as_iri)
            .collect()
    }

    pub(crate) fn merge(&mut self, other: Entity) {
        for (predicate, terms) in other.properties {
            let slot = self.properties.entry(predicate).or_default();
            for term in terms {
                if !slot.contains(&term) {
                    slot.push(term);
                }
            }
        }
    }
}

/// Ordered collection of entities mapped to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    entities: IndexMap<String, Entity>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entity`, replacing any entity with the same identifier.
    pub fn set_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.insert(entity.id.clone(), entity);
        self
    }

    /// Inserts `entity`, merging its values into an existing entity with the same id.
    pub fn merge_entity(&mut self, entity: Entity) -> &mut Self {
        match self.entities.get_mut(&entity.id) {
            Some(existing) => existing.merge(entity),
            None => {
                self.entities.insert(entity.id.clone(), entity);
            }
        }
        self
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
