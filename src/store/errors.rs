//! Store-boundary errors.
//!
//! Everything here is server-class: the transport or the driver failed, not
//! the caller's request. The core never retries these.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures at the document-store boundary
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or the round-trip failed mid-flight
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a command-level failure
    #[error("store command failed: {0}")]
    Command(String),
}
