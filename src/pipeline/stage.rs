//! Pipeline stage representation.

use bson::{doc, Document};

/// One aggregation stage. Ordering of stages in a pipeline is significant
/// and caller-controlled; a stage renders to exactly one store-side stage
/// document.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    /// `$match` with the given predicate body
    Match(Document),
    /// `$sort` with a field → direction mapping
    Sort(Document),
    /// `$skip` numeric offset
    Skip(u64),
    /// `$limit` numeric cap
    Limit(u64),
    /// `$project` inclusion mapping
    Project(Document),
}

impl PipelineStage {
    /// Store-side stage operator name
    pub fn operator(&self) -> &'static str {
        match self {
            PipelineStage::Match(_) => "$match",
            PipelineStage::Sort(_) => "$sort",
            PipelineStage::Skip(_) => "$skip",
            PipelineStage::Limit(_) => "$limit",
            PipelineStage::Project(_) => "$project",
        }
    }

    /// Renders the stage as a store-side document
    pub fn to_document(&self) -> Document {
        match self {
            PipelineStage::Match(body) => doc! { "$match": body.clone() },
            PipelineStage::Sort(body) => doc! { "$sort": body.clone() },
            PipelineStage::Skip(n) => doc! { "$skip": *n as i64 },
            PipelineStage::Limit(n) => doc! { "$limit": *n as i64 },
            PipelineStage::Project(body) => doc! { "$project": body.clone() },
        }
    }
}
