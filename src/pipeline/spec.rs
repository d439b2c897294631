//! Structured query request spec.

use bson::Document;
use serde::{Deserialize, Serialize};

/// A structured query request as received from the routing layer.
///
/// Every field is optional; each present, non-empty field contributes
/// exactly one pipeline stage. Filter values are matched by native type —
/// numeric and boolean equality work without stringification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    /// Exact field/value equality pairs (no regex, no ranges)
    pub simple_filter: Option<Document>,
    /// Field → direction mapping; direction is 1 (ascending) or -1
    /// (descending). Key order is the sort precedence.
    pub simple_sort: Option<Document>,
    /// Categories the document's `categorias` array must intersect
    pub categories: Vec<String>,
    /// Documents to skip before returning results
    pub skip: Option<u64>,
    /// Cap on returned documents
    pub limit: Option<u64>,
    /// Fields to include in the result (inclusion projection)
    pub project: Vec<String>,
}

impl QuerySpec {
    /// Empty spec (builds an empty pipeline)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the equality filter
    pub fn with_filter(mut self, filter: Document) -> Self {
        self.simple_filter = Some(filter);
        self
    }

    /// Sets the sort mapping
    pub fn with_sort(mut self, sort: Document) -> Self {
        self.simple_sort = Some(sort);
        self
    }

    /// Sets the category intersection filter
    pub fn with_categories(
        mut self,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the skip offset
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the limit cap
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the inclusion projection
    pub fn with_projection(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.project = fields.into_iter().map(Into::into).collect();
        self
    }
}
