//! Audited query execution for comanda
//!
//! The service front door: resolve the collection against the allow-list,
//! build or accept a pipeline, audit it, and only then run the real
//! operation and normalize its results. The audit is strictly sequential
//! with the real operation — a rejected audit means the real operation is
//! never issued.

mod errors;
mod service;

pub use errors::{ErrorKind, QueryError, QueryResult};
pub use service::QueryService;
