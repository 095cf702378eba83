//! Expanded JSON-LD codec for datasets.
//!
//! Only the expanded document form is handled: node objects with absolute
//! predicate IRIs, `@id`, `@type`, `@value`, `@language` and `@set`. Documents
//! carrying an `@context` (compacted form) are rejected rather than guessed at.
//! Relative identifiers are resolved against the document URL.

use serde_json::{Map, Value, json};
use url::Url;

use crate::error::DatasetError;
use crate::model::{Dataset, Entity, Literal, Term};
use podline_core::vocab::rdf;

/// Media type used for reading and writing documents.
pub const MEDIA_TYPE: &str = "application/ld+json";

/// Serializes `dataset` into an expanded JSON-LD array.
pub fn encode(dataset: &Dataset) -> Value {
    let nodes: Vec<Value> = dataset.entities().map(encode_entity).collect();
    Value::Array(nodes)
}

fn encode_entity(entity: &Entity) -> Value {
    let mut node = Map::new();
    node.insert("@id".to_string(), Value::String(entity.id().to_string()));
    for (predicate, terms) in entity.properties() {
        let values: Vec<Value> = terms.iter().map(encode_term).collect();
        node.insert(predicate.to_string(), Value::Array(values));
    }
    Value::Object(node)
}

fn encode_term(term: &Term) -> Value {
    match term {
        Term::Iri(iri) => json!({ "@id": iri }),
        Term::Literal(lit) => {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), Value::String(lit.value.clone()));
            if let Some(datatype) = &lit.datatype {
                obj.insert("@type".to_string(), Value::String(datatype.clone()));
            }
            if let Some(language) = &lit.language {
                obj.insert("@language".to_string(), Value::String(language.clone()));
            }
            Value::Object(obj)
        }
    }
}

/// Parses an expanded JSON-LD document fetched from `base`.
pub fn decode(document: &Value, base: &Url) -> Result<Dataset, DatasetError> {
    let mut decoder = Decoder {
        base,
        dataset: Dataset::new(),
        blank_counter: 0,
    };

    let nodes: Vec<&Value> = match document {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => {
            if obj.contains_key("@context") {
                return Err(decoder.error("compacted JSON-LD (@context) is not supported"));
            }
            match obj.get("@graph") {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(_) => return Err(decoder.error("@graph must be an array")),
                None => vec![document],
            }
        }
        _ => return Err(decoder.error("document must be a JSON array or object")),
    };

    for node in nodes {
        decoder.node(node)?;
    }
    Ok(decoder.dataset)
}

struct Decoder<'a> {
    base: &'a Url,
    dataset: Dataset,
    blank_counter: usize,
}

impl Decoder<'_> {
    fn error(&self, message: impl Into<String>) -> DatasetError {
        DatasetError::parse(self.base.as_str(), message)
    }

    fn resolve(&self, iri: &str) -> Result<String, DatasetError> {
        if iri.starts_with("_:") {
            return Ok(iri.to_string());
        }
        self.base
            .join(iri)
            .map(String::from)
            .map_err(|e| self.error(format!("invalid IRI '{iri}': {e}")))
    }

    fn next_blank(&mut self) -> String {
        self.blank_counter += 1;
        format!("_:b{}", self.blank_counter)
    }

    /// Decodes a node object into the dataset and returns its identifier.
    fn node(&mut self, value: &Value) -> Result<String, DatasetError> {
        let obj = value
            .as_object()
            .ok_or_else(|| self.error("node must be a JSON object"))?;
        if obj.contains_key("@context") {
            return Err(self.error("compacted JSON-LD (@context) is not supported"));
        }

        let id = match obj.get("@id") {
            Some(Value::String(id)) => self.resolve(id)?,
            Some(_) => return Err(self.error("@id must be a string")),
            None => self.next_blank(),
        };

        let mut entity = Entity::new(id.clone());
        for (key, values) in obj {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    for ty in as_list(values) {
                        let iri = ty
                            .as_str()
                            .ok_or_else(|| self.error("@type must be a string"))?;
                        let resolved = self.resolve(iri)?;
                        entity.add(rdf::TYPE, Term::Iri(resolved));
                    }
                }
                k if k.starts_with('@') => {
                    tracing::trace!(keyword = k, "Ignoring unsupported JSON-LD keyword");
                }
                predicate => {
                    if Url::parse(predicate).is_err() {
                        return Err(self.error(format!(
                            "predicate '{predicate}' is not an absolute IRI"
                        )));
                    }
                    for item in as_list(values) {
                        for term in self.terms(item)? {
                            entity.add(predicate, term);
                        }
                    }
                }
            }
        }

        self.dataset.merge_entity(entity);
        Ok(id)
    }

    fn terms(&mut self, value: &Value) -> Result<Vec<Term>, DatasetError> {
        match value {
            Value::String(s) => Ok(vec![Term::Literal(Literal::plain(s.clone()))]),
            Value::Bool(_) | Value::Number(_) => {
                Ok(vec![Term::Literal(Literal::plain(value.to_string()))])
            }
            Value::Object(obj) => {
                if let Some(raw) = obj.get("@value") {
                    let value = match raw {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let datatype = obj
                        .get("@type")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    let language = obj
                        .get("@language")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    return Ok(vec![Term::Literal(Literal {
                        value,
                        datatype,
                        language,
                    })]);
                }
                if let Some(set) = obj.get("@set") {
                    let mut out = Vec::new();
                    for item in as_list(set) {
                        out.extend(self.terms(item)?);
                    }
                    return Ok(out);
                }
                if obj.contains_key("@list") {
                    tracing::trace!("Skipping @list value");
                    return Ok(Vec::new());
                }
                // Reference or embedded node: anything beyond @id is decoded
                // as its own entity.
                if obj.len() == 1
                    && let Some(Value::String(id)) = obj.get("@id")
                {
                    return Ok(vec![Term::Iri(self.resolve(id)?)]);
                }
                let id = self.node(value)?;
                Ok(vec![Term::Iri(id)])
            }
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.terms(item)?);
                }
                Ok(out)
            }
        }
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}
