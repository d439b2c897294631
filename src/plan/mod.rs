//! Execution-plan introspection for comanda
//!
//! An execution plan is the BSON tree returned by the store's explain
//! facility. This module answers two questions about it:
//!
//! - did the winning plan consult an index anywhere? (`contains_index_scan`)
//! - what did the execution actually examine? (`ExecutionStats` extraction)
//!
//! Plans nest to arbitrary depth and any node may or may not carry
//! statistics, so everything here is a recursive walk with no shape
//! assumptions.

mod inspector;
mod stats;

pub use inspector::{
    contains_index_scan, is_collection_scan, is_lookup_stage, COLLECTION_SCAN_STAGE,
    INDEX_SCAN_STAGES, LOOKUP_STAGES,
};
pub use stats::{
    execution_stats, explain_stages, lookup_stage_stats, stat_u64, winning_plan, ExecutionStats,
};
