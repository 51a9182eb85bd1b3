//! Stage-movement service wrapper with observability and derived operations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::{
    BulkMoveOutcome, BulkMoveRequest, MoveStageRequest, StageMovementProvider, StatsTimeframe,
    TRACING_TARGET,
};
use crate::error::{Error, Result};
use crate::types::{
    JobApplication, Pipeline, PipelineStage, StageChangeReason, StageMovementHistoryEntry,
    StageMovementStats, Task,
};

/// Stage-movement service wrapper.
///
/// Wraps any [`StageMovementProvider`] with structured logging and the
/// derived operations that compose base calls: advance-to-next-stage,
/// rejection, and the automation-triggered moves. The inner provider is
/// wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct StageMovementService {
    inner: Arc<dyn StageMovementProvider>,
}

impl fmt::Debug for StageMovementService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageMovementService").finish_non_exhaustive()
    }
}

impl StageMovementService {
    /// Create a new service wrapper around a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: StageMovementProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Moves one application to another stage.
    pub async fn move_to_stage(
        &self,
        application_id: Uuid,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        tracing::debug!(
            target: TRACING_TARGET,
            application_id = %application_id,
            to_stage_id = %request.to_stage_id,
            reason = request.reason.as_ref(),
            "Moving application to stage"
        );

        let result = self.inner.move_to_stage(application_id, request).await;

        match &result {
            Ok(application) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    application_id = %application_id,
                    to_stage_id = %request.to_stage_id,
                    stage_name = application.current_pipeline_stage_name.as_deref(),
                    "Application moved"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    application_id = %application_id,
                    to_stage_id = %request.to_stage_id,
                    error = %error,
                    "Stage move failed"
                );
            }
        }

        result
    }

    /// Moves several applications to the same stage in one call.
    pub async fn bulk_move(&self, request: &BulkMoveRequest) -> Result<BulkMoveOutcome> {
        tracing::debug!(
            target: TRACING_TARGET,
            count = request.application_ids.len(),
            to_stage_id = %request.to_stage_id,
            reason = request.reason.as_ref(),
            "Bulk moving applications"
        );

        let result = self.inner.bulk_move(request).await;

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET,
                count = request.application_ids.len(),
                to_stage_id = %request.to_stage_id,
                error = %error,
                "Bulk move failed"
            );
        }

        result
    }

    /// Fetches the audit history of an application.
    pub async fn stage_history(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<StageMovementHistoryEntry>> {
        self.inner.stage_history(application_id).await
    }

    /// Fetches a pipeline's applications grouped by current stage.
    pub async fn applications_by_stage(
        &self,
        pipeline_id: Uuid,
    ) -> Result<HashMap<Uuid, Vec<JobApplication>>> {
        self.inner.applications_by_stage(pipeline_id).await
    }

    /// Fetches aggregate movement metrics for a pipeline.
    pub async fn movement_stats(
        &self,
        pipeline_id: Uuid,
        timeframe: Option<&StatsTimeframe>,
    ) -> Result<StageMovementStats> {
        self.inner.movement_stats(pipeline_id, timeframe).await
    }

    /// Fetches one application.
    pub async fn get_application(&self, application_id: Uuid) -> Result<JobApplication> {
        self.inner.get_application(application_id).await
    }

    /// Fetches one pipeline.
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        self.inner.get_pipeline(pipeline_id).await
    }

    /// Advances an application to the next stage of its pipeline.
    ///
    /// No dedicated server endpoint exists for this, so the service fetches
    /// the application and the pipeline first (two extra round trips),
    /// resolves the current stage by id within the order-sorted stage list,
    /// and issues a regular move to the stage that follows. The two fetches
    /// are not cross-checked; the responses are used as received.
    ///
    /// # Errors
    ///
    /// Fails with a [`FailedPrecondition`](crate::ErrorKind::FailedPrecondition)
    /// error, without issuing a move, when the application has no current
    /// stage, the current stage is not part of the pipeline, or the
    /// application is already at the final stage.
    pub async fn advance_to_next_stage(
        &self,
        application_id: Uuid,
        pipeline_id: Uuid,
        reason: Option<StageChangeReason>,
        notes: Option<&str>,
    ) -> Result<JobApplication> {
        let application = self.inner.get_application(application_id).await?;
        let pipeline = self.inner.get_pipeline(pipeline_id).await?;

        let current_stage_id = application.current_pipeline_stage_id.ok_or_else(|| {
            Error::failed_precondition().with_message("application has no current stage")
        })?;

        let sorted = pipeline.sorted_stages();
        let position = sorted
            .iter()
            .position(|stage| stage.id == current_stage_id)
            .ok_or_else(|| {
                Error::failed_precondition()
                    .with_message("current stage not found in pipeline")
            })?;

        let Some(next) = sorted.get(position + 1) else {
            return Err(
                Error::failed_precondition().with_message("application already at final stage")
            );
        };

        tracing::debug!(
            target: TRACING_TARGET,
            application_id = %application_id,
            pipeline_id = %pipeline_id,
            from_stage = sorted[position].name.as_str(),
            to_stage = next.name.as_str(),
            "Advancing application to next stage"
        );

        let mut request = MoveStageRequest::new(
            next.id,
            reason.unwrap_or(StageChangeReason::AutomatedMove),
        )
        .with_metadata(json!({
            "triggerType": "advance_next_stage",
            "fromStageId": sorted[position].id,
            "fromStageName": sorted[position].name,
            "toStageName": next.name,
        }));
        if let Some(notes) = notes {
            request = request.with_notes(notes);
        }

        self.move_to_stage(application_id, &request).await
    }

    /// Moves an application into a rejection stage.
    pub async fn reject(
        &self,
        application_id: Uuid,
        to_stage_id: Uuid,
        notes: Option<&str>,
    ) -> Result<JobApplication> {
        let mut request =
            MoveStageRequest::new(to_stage_id, StageChangeReason::RejectedByCompany);
        if let Some(notes) = notes {
            request = request.with_notes(notes);
        }
        self.move_to_stage(application_id, &request).await
    }

    /// Moves an application after a linked task was completed.
    ///
    /// The audit metadata records the originating task and the stage names
    /// involved, so the history reads without further lookups.
    pub async fn move_after_task_completion(
        &self,
        application_id: Uuid,
        to_stage: &PipelineStage,
        from_stage: Option<&PipelineStage>,
        task: &Task,
    ) -> Result<JobApplication> {
        let request = MoveStageRequest::new(to_stage.id, StageChangeReason::TaskCompleted)
            .with_metadata(json!({
                "triggerType": "task_completion",
                "taskId": task.id,
                "taskTitle": task.title,
                "taskType": task.task_type,
                "fromStageName": from_stage.map(|stage| stage.name.clone()),
                "toStageName": to_stage.name,
            }));
        self.move_to_stage(application_id, &request).await
    }

    /// Moves an application after an interview finished.
    ///
    /// `passed` selects between the completed and failed audit reasons.
    pub async fn move_after_interview_completed(
        &self,
        application_id: Uuid,
        to_stage_id: Uuid,
        interview_id: Uuid,
        passed: bool,
    ) -> Result<JobApplication> {
        let reason = if passed {
            StageChangeReason::InterviewCompleted
        } else {
            StageChangeReason::InterviewFailed
        };
        let request = MoveStageRequest::new(to_stage_id, reason).with_metadata(json!({
            "triggerType": "interview_completion",
            "interviewId": interview_id,
            "passed": passed,
        }));
        self.move_to_stage(application_id, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{MockConfig, MockProvider};
    use super::*;
    use crate::ErrorKind;
    use crate::types::TaskStatus;

    fn stage(name: &str, order: i32) -> PipelineStage {
        PipelineStage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            order,
            color: None,
            is_terminal: order == 2,
        }
    }

    fn fixture() -> (MockProvider, Pipeline, JobApplication) {
        let stages = vec![stage("Screening", 0), stage("Interview", 1), stage("Offer", 2)];
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
            stage: Some("Interview".to_string()),
            current_pipeline_stage_id: Some(pipeline.stages[1].id),
            current_pipeline_stage_name: Some("Interview".to_string()),
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

    #[tokio::test]
    async fn test_advance_moves_to_following_stage() {
        let (provider, pipeline, application) = fixture();
        let service = StageMovementService::new(provider.clone());

        let updated = service
            .advance_to_next_stage(application.id, pipeline.id, None, None)
            .await
            .unwrap();

        let offer = &pipeline.sorted_stages()[2];
        assert_eq!(updated.current_pipeline_stage_id, Some(offer.id));

        let moves = provider.recorded_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].1.to_stage_id, offer.id);
        assert_eq!(moves[0].1.reason, StageChangeReason::AutomatedMove);
    }

    #[tokio::test]
    async fn test_advance_fails_at_final_stage_without_moving() {
        let (_, pipeline, mut application) = fixture();
        application.current_pipeline_stage_id = Some(pipeline.sorted_stages()[2].id);
        let provider = MockProvider::new(MockConfig {
            applications: vec![application.clone()],
            pipelines: vec![pipeline.clone()],
            ..Default::default()
        });
        let service = StageMovementService::new(provider.clone());

        let error = service
            .advance_to_next_stage(application.id, pipeline.id, None, None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
        assert!(provider.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn test_advance_fails_when_stage_not_in_pipeline() {
        let (_, pipeline, mut application) = fixture();
        application.current_pipeline_stage_id = Some(Uuid::new_v4());
        let provider = MockProvider::new(MockConfig {
            applications: vec![application.clone()],
            pipelines: vec![pipeline.clone()],
            ..Default::default()
        });
        let service = StageMovementService::new(provider.clone());

        let error = service
            .advance_to_next_stage(application.id, pipeline.id, None, None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
        assert!(provider.recorded_moves().is_empty());
    }

    #[tokio::test]
    async fn test_advance_twice_stops_at_terminal_stage() {
        let (provider, pipeline, application) = fixture();
        let service = StageMovementService::new(provider.clone());

        service
            .advance_to_next_stage(application.id, pipeline.id, None, None)
            .await
            .unwrap();
        let error = service
            .advance_to_next_stage(application.id, pipeline.id, None, None)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
        assert_eq!(provider.recorded_moves().len(), 1);
    }

    #[tokio::test]
    async fn test_task_completion_move_carries_task_metadata() {
        let (provider, pipeline, application) = fixture();
        let service = StageMovementService::new(provider.clone());
        let sorted = pipeline.sorted_stages();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Screen resume".to_string(),
            status: TaskStatus::Completed,
            task_type: "screening_review".to_string(),
            candidate_id: Some(application.candidate_id),
            job_id: application.job_id,
        };

        service
            .move_after_task_completion(application.id, &sorted[2], Some(&sorted[1]), &task)
            .await
            .unwrap();

        let moves = provider.recorded_moves();
        assert_eq!(moves.len(), 1);
        let request = &moves[0].1;
        assert_eq!(request.reason, StageChangeReason::TaskCompleted);
        let metadata = request.metadata.as_ref().unwrap();
        assert_eq!(metadata["taskId"], serde_json::json!(task.id));
        assert_eq!(metadata["taskType"], "screening_review");
        assert_eq!(metadata["toStageName"], "Offer");
    }

    #[tokio::test]
    async fn test_interview_move_selects_reason_by_result() {
        let (provider, pipeline, application) = fixture();
        let service = StageMovementService::new(provider.clone());
        let offer = pipeline.sorted_stages()[2].clone();

        service
            .move_after_interview_completed(application.id, offer.id, Uuid::new_v4(), false)
            .await
            .unwrap();

        let moves = provider.recorded_moves();
        assert_eq!(moves[0].1.reason, StageChangeReason::InterviewFailed);
    }
}
