//! Structured logging for comanda
//!
//! Synchronous JSON lines with deterministic key ordering; one line per
//! event. The only events the core emits are audit outcomes.

mod logger;

pub use logger::{Logger, Severity};
