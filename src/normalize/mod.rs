//! Identifier normalization for transport.
//!
//! Store results embed opaque ObjectIds anywhere in a nested document tree;
//! the routing layer wants plain strings. `normalize_ids` is a pure
//! recursive rewrite — new values out, inputs consumed, no side effects.
//! Inbound identifier strings go the other way through `parse_object_id`.

use bson::oid::ObjectId;
use bson::{Bson, Document};
use thiserror::Error;

/// Identifier errors. Client-class: the request carried a bad id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The string is not a valid canonical ObjectId
    #[error("'{0}' is not a valid document identifier")]
    MalformedIdentifier(String),
}

/// Recursively converts every ObjectId in the value to its canonical hex
/// string. Documents and sequences are rebuilt with normalized members;
/// anything else passes through unchanged.
///
/// Idempotent: strings pass through, so re-applying to its own output is a
/// no-op. Terminates on acyclic input (store results are always trees).
pub fn normalize_ids(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(id) => Bson::String(id.to_hex()),
        Bson::Document(document) => Bson::Document(
            document
                .into_iter()
                .map(|(key, value)| (key, normalize_ids(value)))
                .collect(),
        ),
        Bson::Array(elements) => Bson::Array(elements.into_iter().map(normalize_ids).collect()),
        other => other,
    }
}

/// [`normalize_ids`] over a whole document
pub fn normalize_document(document: Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, normalize_ids(value)))
        .collect()
}

/// Parses a request-supplied identifier string into the store's canonical
/// identifier type.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, NormalizeError> {
    ObjectId::parse_str(raw).map_err(|_| NormalizeError::MalformedIdentifier(raw.to_string()))
}
