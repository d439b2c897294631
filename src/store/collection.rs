//! Collection handle contract for the document-store driver.
//!
//! Any driver satisfying this contract works; no wire format is assumed.
//! `find` and `aggregate` return lazy document streams, `explain` is a
//! read-only administrative round-trip, and `create_index` is the
//! index-management primitive the catalog bootstraps through.

use std::pin::Pin;

use async_trait::async_trait;
use bson::Document;
use futures::Stream;

use super::errors::StoreResult;

/// Lazy sequence of documents produced by `find`/`aggregate`
pub type DocumentStream = Pin<Box<dyn Stream<Item = StoreResult<Document>> + Send>>;

/// What the explain request describes: a find filter or an aggregation
/// pipeline.
#[derive(Debug, Clone)]
pub enum ExplainTarget {
    Find(Document),
    Aggregate(Vec<Document>),
}

/// Explain verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Plan selection only
    QueryPlanner,
    /// Plan selection plus execution counters
    ExecutionStats,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::QueryPlanner => "queryPlanner",
            Verbosity::ExecutionStats => "executionStats",
        }
    }
}

/// A request for a query-execution-plan explanation
#[derive(Debug, Clone)]
pub struct ExplainRequest {
    pub target: ExplainTarget,
    pub verbosity: Verbosity,
}

impl ExplainRequest {
    /// Explain a `find` with the given filter
    pub fn find(filter: Document) -> Self {
        Self {
            target: ExplainTarget::Find(filter),
            verbosity: Verbosity::ExecutionStats,
        }
    }

    /// Explain an `aggregate` with the given pipeline
    pub fn aggregate(pipeline: Vec<Document>) -> Self {
        Self {
            target: ExplainTarget::Aggregate(pipeline),
            verbosity: Verbosity::ExecutionStats,
        }
    }

    /// Overrides the verbosity (audits always use execution stats)
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// A single-field ascending index declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: String,
}

impl IndexSpec {
    pub fn on(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Driver-conventional index name (`<field>_1`)
    pub fn name(&self) -> String {
        format!("{}_1", self.field)
    }
}

/// Handle to one collection of the document store.
///
/// Implementations wrap an independent database session; concurrent handles
/// need no coordination between them.
#[async_trait]
pub trait CollectionHandle: Send + Sync {
    /// Collection name this handle is bound to
    fn name(&self) -> &str;

    /// Requests an execution-plan explanation (read-only, administrative)
    async fn explain(&self, request: ExplainRequest) -> StoreResult<Document>;

    /// Executes a find, returning a lazy document stream
    async fn find(&self, filter: Document) -> StoreResult<DocumentStream>;

    /// Executes an aggregation pipeline, returning a lazy document stream
    async fn aggregate(&self, pipeline: Vec<Document>) -> StoreResult<DocumentStream>;

    /// Creates a single-field index if it does not already exist
    async fn create_index(&self, index: IndexSpec) -> StoreResult<()>;
}
