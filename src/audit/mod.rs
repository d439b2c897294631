//! Query auditing for comanda
//!
//! Before a query runs, the auditor asks the store to explain it, inspects
//! the winning plan, and applies the efficiency policy. A failed audit is a
//! rejected request: the real operation is never issued, the failure carries
//! the raw explain payload, and nothing is retried — a rejection means the
//! query or the schema needs an index, which no retry will fix.

mod auditor;
mod errors;
mod policy;
mod report;

pub use auditor::QueryAuditor;
pub use errors::{AuditError, AuditRejection, AuditResult};
pub use policy::AuditPolicy;
pub use report::AuditReport;
