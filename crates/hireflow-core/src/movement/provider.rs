//! Stage-movement provider trait.

use std::collections::HashMap;

use uuid::Uuid;

use super::{BulkMoveOutcome, BulkMoveRequest, MoveStageRequest, StatsTimeframe};
use crate::error::Result;
use crate::types::{JobApplication, Pipeline, StageMovementHistoryEntry, StageMovementStats};

/// Transport-level operations of the stage-movement backend.
///
/// Implementations are thin wrappers over the backend's REST contract: errors
/// propagate to the caller unmodified and no operation retries locally. The
/// derived operations (advance-to-next, move-after-task-completion) live on
/// [`StageMovementService`](super::StageMovementService), which composes these
/// base calls.
#[async_trait::async_trait]
pub trait StageMovementProvider: Send + Sync {
    /// Moves one application to another stage and returns the server's
    /// updated representation.
    async fn move_to_stage(
        &self,
        application_id: Uuid,
        request: &MoveStageRequest,
    ) -> Result<JobApplication>;

    /// Moves several applications to the same stage in a single call,
    /// all-or-nothing from the server's perspective.
    async fn bulk_move(&self, request: &BulkMoveRequest) -> Result<BulkMoveOutcome>;

    /// Fetches the audit history of an application, newest-last as ordered
    /// by the server.
    async fn stage_history(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<StageMovementHistoryEntry>>;

    /// Fetches the applications of a pipeline grouped by their current
    /// stage.
    async fn applications_by_stage(
        &self,
        pipeline_id: Uuid,
    ) -> Result<HashMap<Uuid, Vec<JobApplication>>>;

    /// Fetches aggregate movement metrics for a pipeline.
    async fn movement_stats(
        &self,
        pipeline_id: Uuid,
        timeframe: Option<&StatsTimeframe>,
    ) -> Result<StageMovementStats>;

    /// Fetches one application.
    async fn get_application(&self, application_id: Uuid) -> Result<JobApplication>;

    /// Fetches one pipeline with its stage list.
    async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline>;
}
