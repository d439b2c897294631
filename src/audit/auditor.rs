//! The query auditor.
//!
//! Each audit issues exactly one explain round-trip, runs the plan
//! inspector over the winning plan, and applies the policy checks. The
//! auditor holds no state across calls beyond its policy; concurrent audits
//! need no coordination.

use bson::{Bson, Document};

use crate::plan::{
    contains_index_scan, execution_stats, explain_stages, is_collection_scan, is_lookup_stage,
    lookup_stage_stats, winning_plan, ExecutionStats,
};
use crate::store::{CollectionHandle, ExplainRequest};

use super::errors::{AuditError, AuditRejection, AuditResult};
use super::policy::AuditPolicy;
use super::report::AuditReport;

/// Audits queries against the index-usage policy before they execute.
pub struct QueryAuditor {
    policy: AuditPolicy,
}

impl QueryAuditor {
    /// Creates an auditor with the given policy
    pub fn new(policy: AuditPolicy) -> Self {
        Self { policy }
    }

    /// The policy this auditor enforces
    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    /// Audits a `find` with the given filter.
    ///
    /// Fails when the winning plan has no index-scan stage and zero index
    /// keys were examined, or when the docs/keys scan ratio exceeds the
    /// policy limit.
    pub async fn audit_find<C>(&self, collection: &C, filter: &Document) -> AuditResult<AuditReport>
    where
        C: CollectionHandle + ?Sized,
    {
        let explain = collection
            .explain(ExplainRequest::find(filter.clone()))
            .await?;
        self.check_top_level(collection.name(), &explain, false)
    }

    /// Audits an aggregation pipeline.
    ///
    /// Applies the same checks as [`audit_find`] against the aggregate's
    /// winning plan, and additionally rejects a winning plan whose own stage
    /// is a join that scans its input collection without an index.
    pub async fn audit_aggregate<C>(
        &self,
        collection: &C,
        pipeline: &[Document],
    ) -> AuditResult<AuditReport>
    where
        C: CollectionHandle + ?Sized,
    {
        let explain = collection
            .explain(ExplainRequest::aggregate(pipeline.to_vec()))
            .await?;
        self.check_top_level(collection.name(), &explain, true)
    }

    /// Audits a pipeline containing `$lookup` stages.
    ///
    /// On top of the aggregate checks (applied when the explain carries
    /// top-level plan and counters), walks the explain's stage list and
    /// checks each lookup stage's own counters: documents examined with zero
    /// index keys, or a stage-scoped scan ratio above the limit, reject the
    /// query. Sub-pipelines nested inside a lookup are checked transitively.
    /// An explain with neither top-level plan/counters nor a stage list is
    /// unusable and fails the audit.
    pub async fn audit_lookup<C>(
        &self,
        collection: &C,
        pipeline: &[Document],
    ) -> AuditResult<AuditReport>
    where
        C: CollectionHandle + ?Sized,
    {
        let explain = collection
            .explain(ExplainRequest::aggregate(pipeline.to_vec()))
            .await?;

        // Lookup-heavy explains do not always carry top-level counters; the
        // base checks apply only when they do. At least one of the two
        // sections must be present, otherwise nothing was checked.
        let top_level = match (winning_plan(&explain), execution_stats(&explain)) {
            (Some(plan), Some(stats)) => Some((plan, stats)),
            _ => None,
        };
        let stages = explain_stages(&explain);
        if top_level.is_none() && stages.is_none() {
            return Err(AuditError::MalformedExplain("stages"));
        }

        let mut report = AuditReport {
            collection: collection.name().to_string(),
            index_scan_seen: false,
            stats: None,
        };
        if let Some((plan, stats)) = top_level {
            report = self.check_plan(collection.name(), plan, stats, true, &explain)?;
        }

        if let Some(stages) = stages {
            self.check_lookup_stages(stages, &explain)?;
        }

        Ok(report)
    }

    /// Base checks for find/aggregate: winning plan and top-level counters
    /// are required, then the no-index and scan-ratio rules apply.
    fn check_top_level(
        &self,
        collection: &str,
        explain: &Document,
        check_join: bool,
    ) -> AuditResult<AuditReport> {
        let plan = winning_plan(explain).ok_or(AuditError::MalformedExplain("winningPlan"))?;
        let stats =
            execution_stats(explain).ok_or(AuditError::MalformedExplain("executionStats"))?;
        self.check_plan(collection, plan, stats, check_join, explain)
    }

    fn check_plan(
        &self,
        collection: &str,
        plan: &Bson,
        stats: ExecutionStats,
        check_join: bool,
        explain: &Document,
    ) -> AuditResult<AuditReport> {
        let index_scan_seen = contains_index_scan(plan);

        if !index_scan_seen && stats.keys_examined == 0 {
            return Err(AuditError::rejected(AuditRejection::NoIndexUsed, explain));
        }

        if let Some(ratio) = self.policy.ratio_violation(&stats) {
            return Err(AuditError::rejected(
                AuditRejection::ScanRatioExceeded {
                    ratio,
                    limit: self.policy.max_scan_ratio,
                },
                explain,
            ));
        }

        if check_join {
            if let Some(node) = plan.as_document() {
                self.check_join_input(node, explain)?;
            }
        }

        Ok(AuditReport {
            collection: collection.to_string(),
            index_scan_seen,
            stats: Some(stats),
        })
    }

    /// A winning plan that is itself a join must not feed from a full
    /// collection scan, even when the outer stage examined index keys.
    fn check_join_input(&self, plan: &Document, explain: &Document) -> AuditResult<()> {
        if !is_lookup_stage(plan) {
            return Ok(());
        }
        if let Ok(input) = plan.get_document("inputStage") {
            if is_collection_scan(input) {
                let from = plan
                    .get_str("foreignCollection")
                    .unwrap_or("<unknown>")
                    .to_string();
                return Err(AuditError::rejected(
                    AuditRejection::LookupCollectionScan { from },
                    explain,
                ));
            }
        }
        Ok(())
    }

    /// Walks an explain stage sequence and applies the per-lookup rules,
    /// recursing into sub-pipelines nested inside each lookup.
    fn check_lookup_stages(&self, stages: &[Bson], explain: &Document) -> AuditResult<()> {
        for stage in stages.iter().filter_map(Bson::as_document) {
            let Ok(lookup) = stage.get_document("$lookup") else {
                continue;
            };
            let from = lookup.get_str("from").unwrap_or("<unknown>").to_string();

            if let Some(stats) = lookup_stage_stats(stage) {
                if stats.keys_examined == 0 && stats.docs_examined > 0 {
                    return Err(AuditError::rejected(
                        AuditRejection::LookupNoIndexUsed {
                            from,
                            docs_examined: stats.docs_examined,
                        },
                        explain,
                    ));
                }
                if let Some(ratio) = self.policy.ratio_violation(&stats) {
                    return Err(AuditError::rejected(
                        AuditRejection::LookupScanRatioExceeded {
                            from,
                            ratio,
                            limit: self.policy.max_scan_ratio,
                        },
                        explain,
                    ));
                }
            }

            if let Ok(sub_pipeline) = lookup.get_array("pipeline") {
                self.check_lookup_stages(sub_pipeline, explain)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::doc;

    use crate::store::{DocumentStream, IndexSpec, StoreError, StoreResult};

    /// Handle that answers every explain with a canned payload.
    struct StaticExplainHandle {
        name: &'static str,
        explain: StoreResult<Document>,
    }

    impl StaticExplainHandle {
        fn new(explain: Document) -> Self {
            Self {
                name: "ordenes",
                explain: Ok(explain),
            }
        }

        fn failing(err: StoreError) -> Self {
            Self {
                name: "ordenes",
                explain: Err(err),
            }
        }
    }

    #[async_trait]
    impl CollectionHandle for StaticExplainHandle {
        fn name(&self) -> &str {
            self.name
        }

        async fn explain(&self, _request: ExplainRequest) -> StoreResult<Document> {
            self.explain.clone()
        }

        async fn find(&self, _filter: Document) -> StoreResult<DocumentStream> {
            Ok(Box::pin(futures::stream::iter(Vec::<
                StoreResult<Document>,
            >::new())))
        }

        async fn aggregate(&self, _pipeline: Vec<Document>) -> StoreResult<DocumentStream> {
            Ok(Box::pin(futures::stream::iter(Vec::<
                StoreResult<Document>,
            >::new())))
        }

        async fn create_index(&self, _index: IndexSpec) -> StoreResult<()> {
            Ok(())
        }
    }

    fn find_explain(stage: &str, keys: i64, docs: i64) -> Document {
        doc! {
            "queryPlanner": { "winningPlan": { "stage": stage } },
            "executionStats": { "totalKeysExamined": keys, "totalDocsExamined": docs }
        }
    }

    fn auditor() -> QueryAuditor {
        QueryAuditor::new(AuditPolicy::default())
    }

    #[tokio::test]
    async fn test_find_passes_with_index_scan() {
        let handle = StaticExplainHandle::new(find_explain("IXSCAN", 10, 10));
        let report = auditor()
            .audit_find(&handle, &doc! { "estado": "activo" })
            .await
            .unwrap();

        assert!(report.index_scan_seen);
        assert_eq!(report.collection, "ordenes");
        assert_eq!(report.scan_ratio(), Some(1.0));
    }

    #[tokio::test]
    async fn test_find_rejects_collection_scan() {
        let handle = StaticExplainHandle::new(find_explain("COLLSCAN", 0, 50));
        let err = auditor()
            .audit_find(&handle, &doc! { "estado": "activo" })
            .await
            .unwrap_err();

        match err {
            AuditError::Rejected {
                rejection: AuditRejection::NoIndexUsed,
                explain,
            } => {
                // Raw payload travels with the rejection for diagnosis.
                assert!(explain.get_document("queryPlanner").is_ok());
            }
            other => panic!("expected NoIndexUsed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_admits_ratio_below_limit() {
        // 55 docs / 10 keys = 5.5, under the default limit of 10.
        let handle = StaticExplainHandle::new(find_explain("IXSCAN", 10, 55));
        assert!(auditor().audit_find(&handle, &doc! {}).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_rejects_ratio_above_limit() {
        // 110 docs / 10 keys = 11.
        let handle = StaticExplainHandle::new(find_explain("IXSCAN", 10, 110));
        let err = auditor().audit_find(&handle, &doc! {}).await.unwrap_err();

        match err {
            AuditError::Rejected {
                rejection: AuditRejection::ScanRatioExceeded { ratio, limit },
                ..
            } => {
                assert_eq!(ratio, 11.0);
                assert_eq!(limit, 10.0);
            }
            other => panic!("expected ScanRatioExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_propagates_store_failure() {
        let handle = StaticExplainHandle::failing(StoreError::Unavailable("refused".into()));
        let err = auditor().audit_find(&handle, &doc! {}).await.unwrap_err();
        assert!(matches!(err, AuditError::Store(_)));
    }

    #[tokio::test]
    async fn test_find_rejects_missing_plan() {
        let handle = StaticExplainHandle::new(doc! { "ok": 1 });
        let err = auditor().audit_find(&handle, &doc! {}).await.unwrap_err();
        assert!(matches!(err, AuditError::MalformedExplain("winningPlan")));
    }

    #[tokio::test]
    async fn test_aggregate_rejects_join_over_collection_scan() {
        // Outer stage examined index keys; the join still scans its input.
        let handle = StaticExplainHandle::new(doc! {
            "queryPlanner": { "winningPlan": {
                "stage": "EQ_LOOKUP",
                "foreignCollection": "articulos",
                "indexName": "articulo_id_1",
                "inputStage": { "stage": "COLLSCAN" }
            } },
            "executionStats": { "totalKeysExamined": 25, "totalDocsExamined": 25 }
        });
        let err = auditor()
            .audit_aggregate(&handle, &[doc! { "$match": { "estado": "activo" } }])
            .await
            .unwrap_err();

        match err {
            AuditError::Rejected {
                rejection: AuditRejection::LookupCollectionScan { from },
                ..
            } => assert_eq!(from, "articulos"),
            other => panic!("expected LookupCollectionScan, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_aggregate_passes_join_over_index() {
        let handle = StaticExplainHandle::new(doc! {
            "queryPlanner": { "winningPlan": {
                "stage": "EQ_LOOKUP",
                "foreignCollection": "articulos",
                "inputStage": { "stage": "IXSCAN" }
            } },
            "executionStats": { "totalKeysExamined": 25, "totalDocsExamined": 25 }
        });
        assert!(auditor().audit_aggregate(&handle, &[]).await.is_ok());
    }

    fn lookup_explain(keys: i64, docs: i64) -> Document {
        doc! {
            "stages": [
                { "$cursor": {
                    "queryPlanner": { "winningPlan": { "stage": "IXSCAN" } },
                    "executionStats": { "totalKeysExamined": 20, "totalDocsExamined": 20 }
                } },
                {
                    "$lookup": {
                        "from": "articulos",
                        "localField": "articulo_id",
                        "foreignField": "_id"
                    },
                    "totalKeysExamined": keys,
                    "totalDocsExamined": docs
                }
            ]
        }
    }

    #[tokio::test]
    async fn test_lookup_passes_with_indexed_join() {
        let handle = StaticExplainHandle::new(lookup_explain(40, 40));
        let report = auditor().audit_lookup(&handle, &[]).await.unwrap();
        assert!(report.index_scan_seen);
    }

    #[tokio::test]
    async fn test_lookup_rejects_zero_keys_with_docs() {
        let handle = StaticExplainHandle::new(lookup_explain(0, 120));
        let err = auditor().audit_lookup(&handle, &[]).await.unwrap_err();

        match err {
            AuditError::Rejected {
                rejection: AuditRejection::LookupNoIndexUsed {
                    from,
                    docs_examined,
                },
                ..
            } => {
                assert_eq!(from, "articulos");
                assert_eq!(docs_examined, 120);
            }
            other => panic!("expected LookupNoIndexUsed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_rejects_high_stage_ratio() {
        let handle = StaticExplainHandle::new(lookup_explain(10, 110));
        let err = auditor().audit_lookup(&handle, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            AuditError::Rejected {
                rejection: AuditRejection::LookupScanRatioExceeded { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_lookup_recurses_into_sub_pipeline() {
        // The outer lookup is clean; the offender hides in its sub-pipeline.
        let handle = StaticExplainHandle::new(doc! {
            "stages": [
                {
                    "$lookup": {
                        "from": "articulos",
                        "pipeline": [
                            {
                                "$lookup": { "from": "restaurantes" },
                                "totalKeysExamined": 0,
                                "totalDocsExamined": 33
                            }
                        ]
                    },
                    "totalKeysExamined": 40,
                    "totalDocsExamined": 40
                }
            ]
        });
        let err = auditor().audit_lookup(&handle, &[]).await.unwrap_err();

        match err {
            AuditError::Rejected {
                rejection: AuditRejection::LookupNoIndexUsed { from, .. },
                ..
            } => assert_eq!(from, "restaurantes"),
            other => panic!("expected nested LookupNoIndexUsed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_rejects_explain_without_plan_or_stages() {
        // Nothing to check means nothing was verified.
        let handle = StaticExplainHandle::new(doc! { "ok": 1 });
        let err = auditor().audit_lookup(&handle, &[]).await.unwrap_err();
        assert!(matches!(err, AuditError::MalformedExplain("stages")));
    }

    #[tokio::test]
    async fn test_lookup_ignores_stages_without_counters() {
        // queryPlanner-verbosity lookup stages carry no counters; only the
        // stages that report counters are judged.
        let handle = StaticExplainHandle::new(doc! {
            "stages": [
                { "$lookup": { "from": "articulos" } },
                { "$project": { "nombre": 1 } }
            ]
        });
        assert!(auditor().audit_lookup(&handle, &[]).await.is_ok());
    }
}
