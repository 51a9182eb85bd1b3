//! Job application types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall status of a job application, independent of its pipeline stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// The application is progressing through the pipeline.
    #[default]
    Active,
    /// The candidate received and accepted an offer.
    Hired,
    /// The company rejected the application.
    Rejected,
    /// The candidate withdrew.
    Withdrawn,
}

/// One candidate's application to one job.
///
/// The authoritative copy lives server-side; instances held by this SDK are
/// cached projections of the most recent server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    /// Unique identifier of the application.
    pub id: Uuid,
    /// The candidate this application belongs to.
    pub candidate_id: Uuid,
    /// The job this application targets.
    pub job_id: Uuid,
    /// Overall application status.
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Legacy free-text stage label. Display-only and derived from the
    /// current stage; never matched against stage names.
    #[serde(default)]
    pub stage: Option<String>,
    /// Identifier of the current pipeline stage, if the application has
    /// entered the pipeline. Must reference a stage of `pipeline_id`'s
    /// stage list; the server owns that invariant.
    #[serde(default)]
    pub current_pipeline_stage_id: Option<Uuid>,
    /// Name of the current pipeline stage, denormalized by the server.
    #[serde(default)]
    pub current_pipeline_stage_name: Option<String>,
    /// The pipeline this application progresses through.
    #[serde(default)]
    pub pipeline_id: Option<Uuid>,
    /// When the application entered its current stage.
    #[serde(default)]
    pub stage_entered_at: Option<Timestamp>,
}
