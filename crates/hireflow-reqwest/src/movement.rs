//! Stage-movement provider over the backend REST contract.

use std::collections::HashMap;

use uuid::Uuid;

use hireflow_core::{
    BulkMoveOutcome, BulkMoveRequest, JobApplication, MoveStageRequest, Pipeline, Result,
    StageMovementHistoryEntry, StageMovementProvider, StageMovementService, StageMovementStats,
    StatsTimeframe,
};

use crate::client::ApiClient;

/// Tracing target for stage-movement requests.
pub const TRACING_TARGET: &str = "hireflow_reqwest::movement";

/// Stage-movement client for the hireflow backend.
///
/// Implements [`StageMovementProvider`] as a thin wrapper over the REST
/// endpoints; every error propagates to the caller unmodified and nothing
/// retries locally.
#[derive(Clone, Debug)]
pub struct StageMovementClient {
    api: ApiClient,
}

impl StageMovementClient {
    /// Creates a new stage-movement client over an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Converts this client into a [`StageMovementService`] for use with
    /// dependency injection.
    pub fn into_service(self) -> StageMovementService {
        StageMovementService::new(self)
    }
}

#[async_trait::async_trait]
impl StageMovementProvider for StageMovementClient {
    async fn move_to_stage(
        &self,
        application_id: Uuid,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        tracing::debug!(
            target: TRACING_TARGET,
            application_id = %application_id,
            to_stage_id = %request.to_stage_id,
            "POST move-stage"
        );
        self.api
            .post_json(&format!("job-applications/{application_id}/move-stage"), request)
            .await
    }

    async fn bulk_move(&self, request: &BulkMoveRequest) -> Result<BulkMoveOutcome> {
        tracing::debug!(
            target: TRACING_TARGET,
            count = request.application_ids.len(),
            to_stage_id = %request.to_stage_id,
            "POST bulk-move-stage"
        );
        self.api
            .post_json("job-applications/bulk-move-stage", request)
            .await
    }

    async fn stage_history(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<StageMovementHistoryEntry>> {
        self.api
            .get_json(&format!("job-applications/{application_id}/stage-history"), &[])
            .await
    }

    async fn applications_by_stage(
        &self,
        pipeline_id: Uuid,
    ) -> Result<HashMap<Uuid, Vec<JobApplication>>> {
        self.api
            .get_json(&format!("job-applications/pipeline/{pipeline_id}/by-stage"), &[])
            .await
    }

    async fn movement_stats(
        &self,
        pipeline_id: Uuid,
        timeframe: Option<&StatsTimeframe>,
    ) -> Result<StageMovementStats> {
        let mut query = Vec::new();
        if let Some(timeframe) = timeframe {
            if let Some(from) = timeframe.from {
                query.push(("from", from.to_string()));
            }
            if let Some(to) = timeframe.to {
                query.push(("to", to.to_string()));
            }
        }
        self.api
            .get_json(&format!("job-applications/pipeline/{pipeline_id}/stats"), &query)
            .await
    }

    async fn get_application(&self, application_id: Uuid) -> Result<JobApplication> {
        self.api
            .get_json(&format!("job-applications/{application_id}"), &[])
            .await
    }

    async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        self.api.get_json(&format!("pipelines/{pipeline_id}"), &[]).await
    }
}
