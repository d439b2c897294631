//! Unified query-layer errors.
//!
//! Validation failures are client-caused and map to a 4xx-equivalent;
//! infrastructure failures are server-caused and map to a 5xx-equivalent.
//! The routing layer only needs `kind()` to pick a status family.

use bson::Document;
use thiserror::Error;

use crate::audit::{AuditError, AuditRejection};
use crate::normalize::NormalizeError;
use crate::pipeline::PipelineError;
use crate::store::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Who caused the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller must fix the request (or add an index): 4xx-equivalent
    Client,
    /// Infrastructure problem: 5xx-equivalent
    Server,
}

/// Query-layer errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// The index-usage audit rejected the query; carries the raw explain
    /// payload for diagnosis
    #[error("query rejected by index audit: {rejection}")]
    AuditRejected {
        rejection: AuditRejection,
        explain: Box<Document>,
    },

    /// Request carried an unparseable document identifier
    #[error(transparent)]
    MalformedIdentifier(#[from] NormalizeError),

    /// Collection name is not on the allow-list
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    /// Request spec could not be turned into a pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Store round-trip failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Store answered the explain with an unusable payload
    #[error("malformed explain output: missing {0}")]
    MalformedExplain(&'static str),
}

impl QueryError {
    /// Classifies the error for status mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::AuditRejected { .. }
            | QueryError::MalformedIdentifier(_)
            | QueryError::UnknownCollection(_)
            | QueryError::Pipeline(_) => ErrorKind::Client,
            QueryError::Store(_) | QueryError::MalformedExplain(_) => ErrorKind::Server,
        }
    }
}

impl From<AuditError> for QueryError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Rejected { rejection, explain } => {
                QueryError::AuditRejected { rejection, explain }
            }
            AuditError::Store(err) => QueryError::Store(err),
            AuditError::MalformedExplain(section) => QueryError::MalformedExplain(section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_client_classification() {
        let audit = QueryError::AuditRejected {
            rejection: AuditRejection::NoIndexUsed,
            explain: Box::new(doc! {}),
        };
        assert_eq!(audit.kind(), ErrorKind::Client);

        let id = QueryError::MalformedIdentifier(NormalizeError::MalformedIdentifier("x".into()));
        assert_eq!(id.kind(), ErrorKind::Client);

        let unknown = QueryError::UnknownCollection("facturas".into());
        assert_eq!(unknown.kind(), ErrorKind::Client);

        let pipeline = QueryError::Pipeline(PipelineError::InvalidSortDirection {
            field: "fecha".into(),
        });
        assert_eq!(pipeline.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_server_classification() {
        let store = QueryError::Store(StoreError::Unavailable("down".into()));
        assert_eq!(store.kind(), ErrorKind::Server);

        let explain = QueryError::MalformedExplain("winningPlan");
        assert_eq!(explain.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_audit_error_conversion_keeps_payload() {
        let source = AuditError::Rejected {
            rejection: AuditRejection::NoIndexUsed,
            explain: Box::new(doc! { "queryPlanner": {} }),
        };
        match QueryError::from(source) {
            QueryError::AuditRejected { explain, .. } => {
                assert!(explain.get_document("queryPlanner").is_ok());
            }
            other => panic!("expected AuditRejected, got {other:?}"),
        }
    }
}
