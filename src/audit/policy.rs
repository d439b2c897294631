//! Audit policy configuration.

use crate::plan::ExecutionStats;

/// Tunable thresholds for the query audit.
///
/// The scan-ratio limit bounds documents examined per index key examined; a
/// query above it is using an overly broad index or a partial-match scan.
#[derive(Debug, Clone)]
pub struct AuditPolicy {
    /// Maximum admitted docs-examined / keys-examined ratio.
    pub max_scan_ratio: f64,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            max_scan_ratio: 10.0,
        }
    }
}

impl AuditPolicy {
    /// Policy with a non-default ratio limit
    pub fn with_max_scan_ratio(max_scan_ratio: f64) -> Self {
        Self { max_scan_ratio }
    }

    /// Returns the offending ratio when the stats exceed the limit.
    ///
    /// The limit itself is admitted; only ratios strictly above it fail.
    pub fn ratio_violation(&self, stats: &ExecutionStats) -> Option<f64> {
        match stats.scan_ratio() {
            Some(ratio) if ratio > self.max_scan_ratio => Some(ratio),
            _ => None,
        }
    }
}
