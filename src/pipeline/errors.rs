//! Pipeline-builder errors. All client-class: the request spec is wrong.

use thiserror::Error;

/// Result type for pipeline construction
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Invalid request specs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Sort directions must be the integers 1 (ascending) or -1 (descending)
    #[error("sort direction for field '{field}' must be 1 or -1")]
    InvalidSortDirection { field: String },
}
