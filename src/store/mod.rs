//! Document-store seam for comanda
//!
//! The real driver (and its wire protocol) lives outside this crate. The
//! core only needs a collection handle that can explain a query, run
//! find/aggregate, and create indexes. Handles are acquired once per
//! process scope and injected into callers — never rebuilt per request.

mod catalog;
mod collection;
mod errors;

pub use catalog::{ensure_indexes, Collection};
pub use collection::{
    CollectionHandle, DocumentStream, ExplainRequest, ExplainTarget, IndexSpec, Verbosity,
};
pub use errors::{StoreError, StoreResult};
