//! Recursive index-scan detection over explain-plan trees.
//!
//! The walk visits every branch of the plan: a stage that uses an index may
//! sit behind FETCH, OR, SORT_MERGE or a lookup's inner pipeline, and a node
//! may have any number of mapping- or sequence-typed children.

use bson::Bson;

/// Stage tags that indicate an index was consulted.
pub const INDEX_SCAN_STAGES: [&str; 2] = ["IXSCAN", "EXPRESS_IXSCAN"];

/// Stage tag for a full collection scan.
pub const COLLECTION_SCAN_STAGE: &str = "COLLSCAN";

/// Stage tags for join-like (lookup) stages.
pub const LOOKUP_STAGES: [&str; 2] = ["EQ_LOOKUP", "EQ_LOOKUP_UNWIND"];

/// Returns true if any node in the plan tree, at any depth, carries a
/// `stage` field equal to a recognized index-scan tag.
///
/// Scalars are never index scans. Mappings match on their own `stage` field
/// or on any nested mapping/sequence value; sequences match on any element.
pub fn contains_index_scan(plan: &Bson) -> bool {
    match plan {
        Bson::Document(node) => {
            if let Ok(stage) = node.get_str("stage") {
                if INDEX_SCAN_STAGES.contains(&stage) {
                    return true;
                }
            }
            node.iter().any(|(_, value)| match value {
                Bson::Document(_) | Bson::Array(_) => contains_index_scan(value),
                _ => false,
            })
        }
        Bson::Array(elements) => elements.iter().any(contains_index_scan),
        _ => false,
    }
}

/// Returns true if the node's own `stage` field is a full collection scan.
pub fn is_collection_scan(node: &bson::Document) -> bool {
    node.get_str("stage") == Ok(COLLECTION_SCAN_STAGE)
}

/// Returns true if the node's own `stage` field is a join-like stage.
pub fn is_lookup_stage(node: &bson::Document) -> bool {
    matches!(node.get_str("stage"), Ok(stage) if LOOKUP_STAGES.contains(&stage))
}
