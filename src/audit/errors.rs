//! Audit error types.
//!
//! A rejection is client-class: the query is inefficient by policy and the
//! caller has to fix it (usually by adding an index). Store and malformed-
//! explain failures are server-class. The split matters to the routing
//! layer, which maps them to 4xx/5xx equivalents.

use bson::Document;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;

/// Why an audit rejected a query
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuditRejection {
    /// Winning plan had no index-scan stage and zero index keys were examined
    #[error("winning plan used no index and examined no index keys")]
    NoIndexUsed,

    /// Documents examined grossly exceed index keys examined
    #[error("scan ratio {ratio:.1} exceeds policy limit {limit:.1}")]
    ScanRatioExceeded { ratio: f64, limit: f64 },

    /// A join stage scans its input collection without an index
    #[error("lookup against '{from}' scans its input without an index")]
    LookupCollectionScan { from: String },

    /// A lookup stage examined documents but no index keys
    #[error("lookup against '{from}' examined {docs_examined} documents with no index keys")]
    LookupNoIndexUsed { from: String, docs_examined: u64 },

    /// A lookup stage's own scan ratio exceeds the policy limit
    #[error("lookup against '{from}' scan ratio {ratio:.1} exceeds policy limit {limit:.1}")]
    LookupScanRatioExceeded {
        from: String,
        ratio: f64,
        limit: f64,
    },
}

/// Audit failures
#[derive(Debug, Error)]
pub enum AuditError {
    /// The query failed a policy check. Carries the raw explain payload for
    /// diagnosis; never retried.
    #[error("query audit rejected: {rejection}")]
    Rejected {
        rejection: AuditRejection,
        explain: Box<Document>,
    },

    /// The explain round-trip failed at the store boundary
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The explain output did not carry an expected section
    #[error("explain output missing {0}")]
    MalformedExplain(&'static str),
}

impl AuditError {
    pub(crate) fn rejected(rejection: AuditRejection, explain: &Document) -> Self {
        AuditError::Rejected {
            rejection,
            explain: Box::new(explain.clone()),
        }
    }
}
