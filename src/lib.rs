//! comanda - query verification core for a restaurant-ordering backend
//!
//! Audits query-execution plans before running queries, builds aggregation
//! pipelines from structured request specs, and normalizes document
//! identifiers in results. The document-store driver and the HTTP routing
//! layer are external collaborators behind the `store` seam.

pub mod audit;
pub mod normalize;
pub mod observe;
pub mod pipeline;
pub mod plan;
pub mod query;
pub mod store;
