//! Hiring pipeline and pipeline stage types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One named, ordered step within a hiring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    /// Unique identifier of the stage.
    pub id: Uuid,
    /// Display name of the stage (e.g. "Screening", "Offer").
    pub name: String,
    /// Position within the pipeline; defines the traversal sequence.
    pub order: i32,
    /// Display color associated with the stage.
    #[serde(default)]
    pub color: Option<String>,
    /// Whether reaching this stage ends the pipeline (hired/rejected).
    #[serde(default)]
    pub is_terminal: bool,
}

/// An ordered sequence of stages a job application progresses through.
///
/// Pipelines are owned by a job configuration and are read-only from the
/// perspective of this SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    /// Unique identifier of the pipeline.
    pub id: Uuid,
    /// Display name of the pipeline.
    pub name: String,
    /// The stages of this pipeline. Ordering of the list itself is not
    /// guaranteed by the server; use [`Pipeline::sorted_stages`].
    pub stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Returns the stages sorted by their `order` field.
    ///
    /// The sort is stable; the relative order of stages that share an
    /// `order` value is whatever the server sent and is not a contract.
    pub fn sorted_stages(&self) -> Vec<PipelineStage> {
        let mut stages = self.stages.clone();
        stages.sort_by_key(|stage| stage.order);
        stages
    }

    /// Looks up a stage by its identifier.
    pub fn stage(&self, stage_id: Uuid) -> Option<&PipelineStage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    /// Returns the position of `stage_id` within the order-sorted stage
    /// list, or `None` if the stage does not belong to this pipeline.
    pub fn position_of(&self, stage_id: Uuid) -> Option<usize> {
        self.sorted_stages()
            .iter()
            .position(|stage| stage.id == stage_id)
    }

    /// Computes the stage that follows `stage_id` in traversal order.
    ///
    /// Returns `None` when the stage is the last one or is not part of this
    /// pipeline; distinguishing the two cases is the caller's job via
    /// [`Pipeline::position_of`].
    pub fn next_stage(&self, stage_id: Uuid) -> Option<PipelineStage> {
        let sorted = self.sorted_stages();
        let index = sorted.iter().position(|stage| stage.id == stage_id)?;
        sorted.get(index + 1).cloned()
    }
}
