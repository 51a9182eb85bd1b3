//! Cache-integrated stage-move mutations.
//!
//! Two flavors exist for the same underlying operation. The plain
//! [`StageMoveMutation`] waits for the server, then patches cached lists in
//! place and invalidates; nothing speculative happens, so a failure needs no
//! rollback. The [`OptimisticStageMove`] renders ahead: it rewrites the
//! cache before the call resolves and restores the exact snapshot on
//! failure, reconciling with server truth through a final invalidation pass
//! either way.

use serde_json::Value;
use uuid::Uuid;

use hireflow_core::{
    BulkMoveOutcome, BulkMoveRequest, Error, JobApplication, MoveStageRequest, Result,
    StageMovementService,
};

use crate::key::{QueryKey, keys_touched_by_bulk_move, keys_touched_by_move};
use crate::patch;
use crate::store::QueryCache;

/// Tracing target for cache mutations.
pub const TRACING_TARGET: &str = "hireflow_cache::mutation";

fn application_value(application: &JobApplication) -> Result<Value> {
    serde_json::to_value(application)
        .map_err(|e| Error::serialization().with_source(e))
}

/// Keys of the move table that hold application projections worth patching
/// in place; history and stats only ever reconcile via refetch.
fn patchable_keys(keys: &[QueryKey]) -> Vec<QueryKey> {
    keys.iter()
        .filter(|key| {
            matches!(
                key,
                QueryKey::JobApplications
                    | QueryKey::JobApplication(_)
                    | QueryKey::ApplicationsByStage(_)
            )
        })
        .cloned()
        .collect()
}

/// Non-optimistic stage-move mutation.
#[derive(Debug, Clone)]
pub struct StageMoveMutation {
    cache: QueryCache,
    service: StageMovementService,
}

impl StageMoveMutation {
    /// Creates a mutation bound to a cache and a service.
    pub fn new(cache: QueryCache, service: StageMovementService) -> Self {
        Self { cache, service }
    }

    /// Moves an application, then patches cached lists with the server's
    /// returned object and invalidates the move's key set.
    pub async fn move_to_stage(
        &self,
        application_id: Uuid,
        pipeline_id: Option<Uuid>,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        let application = match self.service.move_to_stage(application_id, request).await {
            Ok(application) => application,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    application_id = %application_id,
                    error = %error,
                    "Stage move failed"
                );
                return Err(error);
            }
        };

        let keys = keys_touched_by_move(application_id, pipeline_id);
        let updated = application_value(&application)?;
        for key in patchable_keys(&keys) {
            self.cache
                .update(&key, |value| {
                    patch::replace_application(value, &updated);
                })
                .await;
        }
        self.cache.invalidate(&keys).await;

        Ok(application)
    }

    /// Bulk-moves applications, then invalidates the batch's key set: the
    /// per-application history and entity keys of every member plus the
    /// shared pipeline keys.
    pub async fn bulk_move(
        &self,
        pipeline_id: Option<Uuid>,
        request: &BulkMoveRequest,
    ) -> Result<BulkMoveOutcome> {
        let outcome = self.service.bulk_move(request).await?;
        self.cache
            .invalidate(&keys_touched_by_bulk_move(&request.application_ids, pipeline_id))
            .await;
        Ok(outcome)
    }
}

/// Optimistic stage-move mutation: render-ahead, reconcile-after.
#[derive(Debug, Clone)]
pub struct OptimisticStageMove {
    cache: QueryCache,
    service: StageMovementService,
}

impl OptimisticStageMove {
    /// Creates a mutation bound to a cache and a service.
    pub fn new(cache: QueryCache, service: StageMovementService) -> Self {
        Self { cache, service }
    }

    /// Optimistically moves an application, matching cached records by
    /// application id.
    pub async fn move_to_stage(
        &self,
        application_id: Uuid,
        pipeline_id: Option<Uuid>,
        to_stage_name: Option<&str>,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        self.execute(application_id, "id", application_id, pipeline_id, to_stage_name, request)
            .await
    }

    /// Optimistically moves an application, matching cached records by
    /// candidate id — the variant used by candidate-centric views.
    pub async fn move_to_stage_by_candidate(
        &self,
        application_id: Uuid,
        candidate_id: Uuid,
        pipeline_id: Option<Uuid>,
        to_stage_name: Option<&str>,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        self.execute(
            application_id,
            "candidateId",
            candidate_id,
            pipeline_id,
            to_stage_name,
            request,
        )
        .await
    }

    async fn execute(
        &self,
        application_id: Uuid,
        match_field: &str,
        match_id: Uuid,
        pipeline_id: Option<Uuid>,
        to_stage_name: Option<&str>,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        // Serializes against concurrent mutations on the same application:
        // a second caller gets a conflict until this one settles.
        let correlation_id = self.cache.begin_mutation(application_id).await?;

        let keys = keys_touched_by_move(application_id, pipeline_id);
        let patch_keys = patchable_keys(&keys);

        // Cancel racing reads, then capture the exact pre-write values.
        self.cache.cancel_refetches(&patch_keys).await;
        let snapshot = self.cache.snapshot(&patch_keys).await;

        for key in &patch_keys {
            self.cache
                .update(key, |value| {
                    patch::apply_stage_fields(
                        value,
                        match_field,
                        match_id,
                        request.to_stage_id,
                        to_stage_name,
                    );
                })
                .await;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            application_id = %application_id,
            correlation_id = %correlation_id,
            to_stage_id = %request.to_stage_id,
            "Applied optimistic stage move"
        );

        let result = self.service.move_to_stage(application_id, request).await;

        match result {
            Ok(application) => {
                self.cache.settle_mutation(application_id).await;
                self.cache.invalidate(&keys).await;
                Ok(application)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    application_id = %application_id,
                    correlation_id = %correlation_id,
                    error = %error,
                    "Optimistic stage move failed, rolling back"
                );
                self.cache.begin_rollback(application_id, correlation_id).await;
                self.cache.restore(snapshot).await;
                self.cache.settle_mutation(application_id).await;
                self.cache.invalidate(&keys).await;
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use hireflow_core::{
        JobApplication, MockConfig, MockProvider, Pipeline, PipelineStage, StageChangeReason,
    };

    use super::*;
    use crate::store::MutationState;

    fn fixture() -> (MockProvider, Pipeline, JobApplication) {
        let stages = vec![
            PipelineStage {
                id: Uuid::new_v4(),
                name: "Screening".to_string(),
                order: 0,
                color: None,
                is_terminal: false,
            },
            PipelineStage {
                id: Uuid::new_v4(),
                name: "Offer".to_string(),
                order: 1,
                color: None,
                is_terminal: true,
            },
        ];
        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            name: "Engineering".to_string(),
            stages,
        };
        let application = JobApplication {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            status: Default::default(),
            stage: Some("Screening".to_string()),
            current_pipeline_stage_id: Some(pipeline.stages[0].id),
            current_pipeline_stage_name: Some("Screening".to_string()),
            pipeline_id: Some(pipeline.id),
            stage_entered_at: None,
        };
        let provider = MockProvider::new(MockConfig {
            applications: vec![application.clone()],
            pipelines: vec![pipeline.clone()],
            ..Default::default()
        });
        (provider, pipeline, application)
    }

    async fn seed_list(cache: &QueryCache, application: &JobApplication) {
        cache
            .put(
                QueryKey::JobApplications,
                json!([serde_json::to_value(application).unwrap()]),
            )
            .await;
    }

    #[tokio::test]
    async fn test_optimistic_move_settles_target_stage() {
        let (provider, pipeline, application) = fixture();
        let cache = QueryCache::new();
        seed_list(&cache, &application).await;
        let mutation =
            OptimisticStageMove::new(cache.clone(), StageMovementService::new(provider));
        let offer = &pipeline.stages[1];

        mutation
            .move_to_stage(
                application.id,
                application.pipeline_id,
                Some(&offer.name),
                &MoveStageRequest::new(offer.id, StageChangeReason::DragDrop),
            )
            .await
            .unwrap();

        let cached = cache.get(&QueryKey::JobApplications).await.unwrap();
        assert_eq!(cached[0]["currentPipelineStageId"], offer.id.to_string());
        assert_eq!(
            cache.mutation_state(application.id).await,
            MutationState::Idle
        );
        // Reconciliation pass marks the whole move key set stale.
        assert!(cache.is_stale(&QueryKey::JobApplications).await);
        assert!(
            cache
                .is_stale(&QueryKey::StageHistory(application.id))
                .await
        );
    }

    #[tokio::test]
    async fn test_optimistic_rollback_restores_exact_value() {
        let (_, pipeline, application) = fixture();
        let provider = MockProvider::new(MockConfig {
            applications: vec![application.clone()],
            pipelines: vec![pipeline.clone()],
            fail_moves: true,
            ..Default::default()
        });
        let cache = QueryCache::new();
        seed_list(&cache, &application).await;
        let before = cache.get(&QueryKey::JobApplications).await.unwrap();
        let mutation =
            OptimisticStageMove::new(cache.clone(), StageMovementService::new(provider));

        let error = mutation
            .move_to_stage(
                application.id,
                application.pipeline_id,
                Some("Offer"),
                &MoveStageRequest::new(pipeline.stages[1].id, StageChangeReason::DragDrop),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), hireflow_core::ErrorKind::ExternalError);
        let after = cache.get(&QueryKey::JobApplications).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(
            cache.mutation_state(application.id).await,
            MutationState::Idle
        );
    }

    #[tokio::test]
    async fn test_concurrent_optimistic_move_is_rejected() {
        let (provider, pipeline, application) = fixture();
        let cache = QueryCache::new();
        seed_list(&cache, &application).await;
        let mutation =
            OptimisticStageMove::new(cache.clone(), StageMovementService::new(provider.clone()));

        // First mutation is still pending.
        cache.begin_mutation(application.id).await.unwrap();

        let error = mutation
            .move_to_stage(
                application.id,
                application.pipeline_id,
                None,
                &MoveStageRequest::new(pipeline.stages[1].id, StageChangeReason::ManualMove),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), hireflow_core::ErrorKind::Conflict);
        assert!(provider.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn test_candidate_variant_matches_by_candidate_id() {
        let (provider, pipeline, application) = fixture();
        let cache = QueryCache::new();
        let by_stage_key = QueryKey::ApplicationsByStage(pipeline.id);
        let mut buckets = serde_json::Map::new();
        buckets.insert(
            pipeline.stages[0].id.to_string(),
            json!([serde_json::to_value(&application).unwrap()]),
        );
        cache.put(by_stage_key.clone(), Value::Object(buckets)).await;
        let mutation =
            OptimisticStageMove::new(cache.clone(), StageMovementService::new(provider));
        let offer = &pipeline.stages[1];

        mutation
            .move_to_stage_by_candidate(
                application.id,
                application.candidate_id,
                Some(pipeline.id),
                Some(&offer.name),
                &MoveStageRequest::new(offer.id, StageChangeReason::DragDrop),
            )
            .await
            .unwrap();

        let cached = cache.get(&by_stage_key).await.unwrap();
        let record = &cached[pipeline.stages[0].id.to_string()][0];
        assert_eq!(record["currentPipelineStageId"], offer.id.to_string());
    }

    #[tokio::test]
    async fn test_plain_move_patches_and_invalidates() {
        let (provider, pipeline, application) = fixture();
        let cache = QueryCache::new();
        seed_list(&cache, &application).await;
        let mutation =
            StageMoveMutation::new(cache.clone(), StageMovementService::new(provider));
        let offer = &pipeline.stages[1];

        mutation
            .move_to_stage(
                application.id,
                application.pipeline_id,
                &MoveStageRequest::new(offer.id, StageChangeReason::ManualMove),
            )
            .await
            .unwrap();

        let cached = cache.get(&QueryKey::JobApplications).await.unwrap();
        assert_eq!(cached[0]["currentPipelineStageId"], offer.id.to_string());
        assert_eq!(cached[0]["currentPipelineStageName"], "Offer");
        assert!(cache.is_stale(&QueryKey::JobApplications).await);
    }

    #[tokio::test]
    async fn test_bulk_move_invalidates_every_member() {
        let (provider, pipeline, application) = fixture();
        let cache = QueryCache::new();
        let others: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let ids = vec![application.id, others[0], others[1]];
        let mutation =
            StageMoveMutation::new(cache.clone(), StageMovementService::new(provider));

        mutation
            .bulk_move(
                Some(pipeline.id),
                &BulkMoveRequest::new(
                    ids.clone(),
                    pipeline.stages[1].id,
                    StageChangeReason::ManualMove,
                ),
            )
            .await
            .unwrap();

        for id in ids {
            assert!(cache.is_stale(&QueryKey::StageHistory(id)).await);
        }
        assert!(cache.is_stale(&QueryKey::PipelineStats(pipeline.id)).await);
        assert!(
            cache
                .is_stale(&QueryKey::ApplicationsByStage(pipeline.id))
                .await
        );
    }
}
