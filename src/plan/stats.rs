//! Extraction of winning plans and execution statistics from explain output.
//!
//! Two explain shapes exist: `find` explains carry `queryPlanner` and
//! `executionStats` at the root; aggregate explains may instead carry a
//! `stages` sequence whose first `$cursor` stage wraps the same two
//! documents. Lookup stages in a `stages` sequence carry their own
//! stage-scoped counters next to the `$lookup` key.

use bson::{Bson, Document};

/// Counters reported by an executionStats-verbosity explain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Index entries examined (`totalKeysExamined`).
    pub keys_examined: u64,
    /// Documents examined (`totalDocsExamined`).
    pub docs_examined: u64,
}

impl ExecutionStats {
    /// Documents examined per index key examined. None when no keys were
    /// examined (the ratio is undefined, not infinite, in that case — the
    /// no-index check covers it).
    pub fn scan_ratio(&self) -> Option<f64> {
        if self.keys_examined == 0 {
            None
        } else {
            Some(self.docs_examined as f64 / self.keys_examined as f64)
        }
    }
}

/// Reads a statistics counter that drivers encode as Int32, Int64 or Double.
pub fn stat_u64(value: &Bson) -> Option<u64> {
    match value {
        Bson::Int32(n) if *n >= 0 => Some(*n as u64),
        Bson::Int64(n) if *n >= 0 => Some(*n as u64),
        Bson::Double(d) if *d >= 0.0 => Some(*d as u64),
        _ => None,
    }
}

/// Extracts the winning plan from an explain document.
///
/// Looks at the root `queryPlanner.winningPlan` first, then falls back to
/// the `$cursor` stage of an aggregate `stages` sequence.
pub fn winning_plan(explain: &Document) -> Option<&Bson> {
    if let Ok(planner) = explain.get_document("queryPlanner") {
        if let Some(plan) = planner.get("winningPlan") {
            return Some(plan);
        }
    }
    cursor_stage(explain)
        .and_then(|cursor| cursor.get_document("queryPlanner").ok())
        .and_then(|planner| planner.get("winningPlan"))
}

/// Extracts top-level execution statistics from an explain document,
/// with the same `$cursor` fallback as [`winning_plan`].
pub fn execution_stats(explain: &Document) -> Option<ExecutionStats> {
    if let Ok(stats) = explain.get_document("executionStats") {
        if let Some(parsed) = stats_from(stats) {
            return Some(parsed);
        }
    }
    cursor_stage(explain)
        .and_then(|cursor| cursor.get_document("executionStats").ok())
        .and_then(stats_from)
}

/// Returns the `stages` sequence of an aggregate explain, if present.
pub fn explain_stages(explain: &Document) -> Option<&Vec<Bson>> {
    explain.get_array("stages").ok()
}

/// Reads the stage-scoped counters a lookup stage carries next to its
/// `$lookup` key. Absent counters mean the store reported none for this
/// stage (queryPlanner verbosity, or an unexecuted branch).
pub fn lookup_stage_stats(stage: &Document) -> Option<ExecutionStats> {
    stats_from(stage)
}

fn stats_from(node: &Document) -> Option<ExecutionStats> {
    let keys = node.get("totalKeysExamined").and_then(stat_u64)?;
    let docs = node.get("totalDocsExamined").and_then(stat_u64)?;
    Some(ExecutionStats {
        keys_examined: keys,
        docs_examined: docs,
    })
}

fn cursor_stage(explain: &Document) -> Option<&Document> {
    explain
        .get_array("stages")
        .ok()?
        .iter()
        .filter_map(Bson::as_document)
        .find_map(|stage| stage.get_document("$cursor").ok())
}
