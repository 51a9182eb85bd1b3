//! The task-completion auto-advance engine.

use std::collections::HashSet;

use strum::{AsRefStr, IntoStaticStr};
use uuid::Uuid;

use hireflow_core::{
    JobApplication, Pipeline, Result, StageMovementService, Task, TaskStatus,
};

/// Tracing target for auto-advance decisions.
pub const TRACING_TARGET: &str = "hireflow_automation::engine";

/// Task types whose completion advances the candidate's pipeline stage.
/// Any other type never advances.
pub const DEFAULT_ADVANCE_TASK_TYPES: [&str; 5] = [
    "screening_review",
    "technical_assessment",
    "background_check",
    "reference_check",
    "interview_preparation",
];

/// Why the engine decided not to advance.
///
/// Every variant is a silent no-op from the user's perspective, not an
/// error; the engine logs the decision and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The status change was not a transition into `Completed`.
    NotACompletionTransition,
    /// The task has no linked candidate.
    NoLinkedCandidate,
    /// The job has no pipeline configured.
    NoPipelineConfigured,
    /// No application matches the task's candidate.
    NoMatchingApplication,
    /// The task type is not in the allow-list.
    TaskTypeNotEligible,
    /// The application has not entered the pipeline.
    NoCurrentStage,
    /// The application's stage id is not part of the pipeline.
    StageNotInPipeline,
    /// The application is already at the last stage.
    AlreadyAtFinalStage,
}

/// What the engine did for one task transition.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Exactly one stage move was issued and confirmed.
    Advanced {
        /// The application that moved.
        application_id: Uuid,
        /// The stage it left.
        from_stage_id: Uuid,
        /// The stage it entered.
        to_stage_id: Uuid,
        /// Display name of the entered stage, for caller notifications.
        to_stage_name: String,
    },
    /// No move was issued; the reason says why.
    Skipped(SkipReason),
}

/// Advances a candidate's pipeline stage when an eligible task completes.
///
/// Task completion and stage advancement are not transactional: a failed
/// advance surfaces as an error for the caller to log or display, but the
/// task's own completion stands regardless. Re-completing a task after a
/// cancel fires the engine again; no idempotency key exists in the wire
/// contract to dedupe on.
#[derive(Debug, Clone)]
pub struct AutoAdvanceEngine {
    service: StageMovementService,
    advance_task_types: HashSet<String>,
}

impl AutoAdvanceEngine {
    /// Creates an engine with the default task-type allow-list.
    pub fn new(service: StageMovementService) -> Self {
        Self {
            service,
            advance_task_types: DEFAULT_ADVANCE_TASK_TYPES
                .iter()
                .map(|task_type| task_type.to_string())
                .collect(),
        }
    }

    /// Replaces the task-type allow-list.
    pub fn with_advance_task_types<I, S>(mut self, task_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.advance_task_types = task_types.into_iter().map(Into::into).collect();
        self
    }

    /// Handles one task status change.
    ///
    /// Fires only on a transition **into** [`TaskStatus::Completed`];
    /// `applications` is the job's cached application list and `pipeline`
    /// the job's pipeline, both supplied by the caller's cache layer.
    ///
    /// # Errors
    ///
    /// Only a failed move call errors; every local precondition miss is a
    /// [`AdvanceOutcome::Skipped`].
    pub async fn handle_task_transition(
        &self,
        task: &Task,
        previous_status: TaskStatus,
        applications: &[JobApplication],
        pipeline: Option<&Pipeline>,
    ) -> Result<AdvanceOutcome> {
        if task.status != TaskStatus::Completed || previous_status == TaskStatus::Completed {
            return Ok(AdvanceOutcome::Skipped(SkipReason::NotACompletionTransition));
        }

        let Some(candidate_id) = task.candidate_id else {
            tracing::debug!(
                target: TRACING_TARGET,
                task_id = %task.id,
                "Task has no linked candidate, skipping auto-advance"
            );
            return Ok(AdvanceOutcome::Skipped(SkipReason::NoLinkedCandidate));
        };

        let Some(pipeline) = pipeline else {
            tracing::debug!(
                target: TRACING_TARGET,
                task_id = %task.id,
                job_id = %task.job_id,
                "Job has no pipeline configured, skipping auto-advance"
            );
            return Ok(AdvanceOutcome::Skipped(SkipReason::NoPipelineConfigured));
        };

        let Some(application) = applications
            .iter()
            .find(|application| application.candidate_id == candidate_id)
        else {
            tracing::info!(
                target: TRACING_TARGET,
                task_id = %task.id,
                candidate_id = %candidate_id,
                "No application matches the task's candidate, skipping auto-advance"
            );
            return Ok(AdvanceOutcome::Skipped(SkipReason::NoMatchingApplication));
        };

        if !self.advance_task_types.contains(&task.task_type) {
            return Ok(AdvanceOutcome::Skipped(SkipReason::TaskTypeNotEligible));
        }

        let Some(current_stage_id) = application.current_pipeline_stage_id else {
            return Ok(AdvanceOutcome::Skipped(SkipReason::NoCurrentStage));
        };

        let sorted = pipeline.sorted_stages();
        let Some(position) = sorted.iter().position(|stage| stage.id == current_stage_id)
        else {
            tracing::warn!(
                target: TRACING_TARGET,
                application_id = %application.id,
                stage_id = %current_stage_id,
                pipeline_id = %pipeline.id,
                "Application's current stage is not in the pipeline, skipping auto-advance"
            );
            return Ok(AdvanceOutcome::Skipped(SkipReason::StageNotInPipeline));
        };

        let Some(next) = sorted.get(position + 1) else {
            return Ok(AdvanceOutcome::Skipped(SkipReason::AlreadyAtFinalStage));
        };

        let moved = self
            .service
            .move_after_task_completion(application.id, next, Some(&sorted[position]), task)
            .await;

        match moved {
            Ok(_) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    task_id = %task.id,
                    application_id = %application.id,
                    to_stage = next.name.as_str(),
                    "Auto-advanced application after task completion"
                );
                Ok(AdvanceOutcome::Advanced {
                    application_id: application.id,
                    from_stage_id: current_stage_id,
                    to_stage_id: next.id,
                    to_stage_name: next.name.clone(),
                })
            }
            Err(error) => {
                // The task stays completed either way; the caller decides
                // whether to surface the failed advance.
                tracing::warn!(
                    target: TRACING_TARGET,
                    task_id = %task.id,
                    application_id = %application.id,
                    error = %error,
                    "Auto-advance move failed"
                );
                Err(error)
            }
        }
    }
}
