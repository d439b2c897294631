//! Audited query execution service.
//!
//! One explain round-trip per audited operation, then the real operation,
//! then identifier normalization. Handles are injected by the caller; the
//! service holds only the audit policy and is safe to share across
//! concurrent requests.

use bson::{doc, Document};
use futures::TryStreamExt;

use crate::audit::{AuditError, AuditPolicy, QueryAuditor};
use crate::normalize::{normalize_document, parse_object_id};
use crate::observe::Logger;
use crate::pipeline::{build_pipeline, render_pipeline, QuerySpec};
use crate::store::{Collection, CollectionHandle};

use super::errors::{QueryError, QueryResult};

/// Runs queries through the audit-then-execute flow.
pub struct QueryService {
    auditor: QueryAuditor,
}

impl QueryService {
    /// Service with the given audit policy
    pub fn new(policy: AuditPolicy) -> Self {
        Self {
            auditor: QueryAuditor::new(policy),
        }
    }

    /// Resolves a request-supplied collection name against the allow-list.
    /// Must be called before any handle is acquired for the name.
    pub fn resolve_collection(name: &str) -> QueryResult<Collection> {
        Collection::parse(name).ok_or_else(|| QueryError::UnknownCollection(name.to_string()))
    }

    /// Audits and runs a find, returning normalized documents.
    pub async fn find_verified<C>(&self, handle: &C, filter: Document) -> QueryResult<Vec<Document>>
    where
        C: CollectionHandle + ?Sized,
    {
        let report = self
            .auditor
            .audit_find(handle, &filter)
            .await
            .map_err(|err| audit_failure(handle.name(), err))?;
        Logger::audit_passed(handle.name(), &report);

        let stream = handle.find(filter).await?;
        let documents: Vec<Document> = stream.try_collect().await?;
        Ok(documents.into_iter().map(normalize_document).collect())
    }

    /// Looks up a single document by its identifier string.
    pub async fn find_by_id_verified<C>(
        &self,
        handle: &C,
        raw_id: &str,
    ) -> QueryResult<Option<Document>>
    where
        C: CollectionHandle + ?Sized,
    {
        let id = parse_object_id(raw_id)?;
        let mut documents = self.find_verified(handle, doc! { "_id": id }).await?;
        Ok(if documents.is_empty() {
            None
        } else {
            Some(documents.swap_remove(0))
        })
    }

    /// Audits and runs an aggregation pipeline, returning normalized
    /// documents. Pipelines containing a `$lookup` stage get the
    /// lookup-aware audit.
    pub async fn aggregate_verified<C>(
        &self,
        handle: &C,
        pipeline: Vec<Document>,
    ) -> QueryResult<Vec<Document>>
    where
        C: CollectionHandle + ?Sized,
    {
        let audit = if pipeline_has_lookup(&pipeline) {
            self.auditor.audit_lookup(handle, &pipeline).await
        } else {
            self.auditor.audit_aggregate(handle, &pipeline).await
        };
        let report = audit.map_err(|err| audit_failure(handle.name(), err))?;
        Logger::audit_passed(handle.name(), &report);

        let stream = handle.aggregate(pipeline).await?;
        let documents: Vec<Document> = stream.try_collect().await?;
        Ok(documents.into_iter().map(normalize_document).collect())
    }

    /// Builds the pipeline for a request spec and runs it audited.
    pub async fn run_spec<C>(&self, handle: &C, spec: &QuerySpec) -> QueryResult<Vec<Document>>
    where
        C: CollectionHandle + ?Sized,
    {
        let stages = build_pipeline(spec)?;
        self.aggregate_verified(handle, render_pipeline(&stages))
            .await
    }
}

fn pipeline_has_lookup(pipeline: &[Document]) -> bool {
    pipeline.iter().any(|stage| stage.contains_key("$lookup"))
}

fn audit_failure(collection: &str, err: AuditError) -> QueryError {
    if let AuditError::Rejected { rejection, .. } = &err {
        Logger::audit_rejected(collection, rejection);
    }
    err.into()
}
