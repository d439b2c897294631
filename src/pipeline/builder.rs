//! Pipeline builder.
//!
//! Each present, non-empty spec field contributes exactly one stage, in a
//! fixed order. The plain filter and the category filter are emitted as two
//! separate `$match` stages; the store folds adjacent matches itself.

use bson::{doc, Bson, Document};

use super::errors::{PipelineError, PipelineResult};
use super::spec::QuerySpec;
use super::stage::PipelineStage;

/// Field holding a document's category array
const CATEGORY_FIELD: &str = "categorias";

/// Builds the stage sequence for a request spec.
///
/// Stage order: match → sort → categorical match → skip → limit → project.
pub fn build_pipeline(spec: &QuerySpec) -> PipelineResult<Vec<PipelineStage>> {
    let mut stages = Vec::new();

    if let Some(filter) = &spec.simple_filter {
        if !filter.is_empty() {
            stages.push(PipelineStage::Match(filter.clone()));
        }
    }

    if let Some(sort) = &spec.simple_sort {
        if !sort.is_empty() {
            validate_sort(sort)?;
            stages.push(PipelineStage::Sort(sort.clone()));
        }
    }

    if !spec.categories.is_empty() {
        stages.push(PipelineStage::Match(category_intersection(
            &spec.categories,
        )));
    }

    if let Some(skip) = spec.skip {
        stages.push(PipelineStage::Skip(skip));
    }

    if let Some(limit) = spec.limit {
        stages.push(PipelineStage::Limit(limit));
    }

    if !spec.project.is_empty() {
        let body: Document = spec
            .project
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect();
        stages.push(PipelineStage::Project(body));
    }

    Ok(stages)
}

/// Renders a stage sequence into store-side pipeline documents
pub fn render_pipeline(stages: &[PipelineStage]) -> Vec<Document> {
    stages.iter().map(PipelineStage::to_document).collect()
}

/// Match body asserting a non-empty intersection between the document's
/// category array and the requested set.
fn category_intersection(categories: &[String]) -> Document {
    let requested: Vec<Bson> = categories
        .iter()
        .map(|c| Bson::String(c.clone()))
        .collect();
    doc! {
        "$expr": {
            "$gt": [
                { "$size": { "$setIntersection": [ format!("${CATEGORY_FIELD}"), requested ] } },
                0
            ]
        }
    }
}

fn validate_sort(sort: &Document) -> PipelineResult<()> {
    for (field, direction) in sort {
        let valid = matches!(
            direction,
            Bson::Int32(1) | Bson::Int32(-1) | Bson::Int64(1) | Bson::Int64(-1)
        );
        if !valid {
            return Err(PipelineError::InvalidSortDirection {
                field: field.clone(),
            });
        }
    }
    Ok(())
}
