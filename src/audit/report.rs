//! Audit pass report.

use crate::plan::ExecutionStats;

/// What a passed audit observed. Computed once per query execution, used
/// for logging, not persisted.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Audited collection
    pub collection: String,
    /// Whether an index-scan stage was found in the winning plan
    pub index_scan_seen: bool,
    /// Top-level execution counters, when the explain carried them
    pub stats: Option<ExecutionStats>,
}

impl AuditReport {
    /// Docs-per-key ratio of the top-level counters, if defined
    pub fn scan_ratio(&self) -> Option<f64> {
        self.stats.as_ref().and_then(ExecutionStats::scan_ratio)
    }
}
