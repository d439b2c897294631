//! Aggregation-pipeline construction for comanda
//!
//! Translates a structured request spec into an ordered sequence of
//! pipeline stages. Stage order is fixed and significant: match → sort →
//! categorical match → skip → limit → project. Sort always precedes
//! pagination — applying skip/limit first would change result semantics.

mod builder;
mod errors;
mod spec;
mod stage;

pub use builder::{build_pipeline, render_pipeline};
pub use errors::{PipelineError, PipelineResult};
pub use spec::QuerySpec;
pub use stage::PipelineStage;
