//! Recruiting task types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a recruiting task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Someone is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Finished. Transitioning into this status triggers auto-advance.
    Completed,
    /// Abandoned without completion.
    Cancelled,
}

/// A recruiting task, optionally linked to a candidate and a job.
///
/// Tasks are user-driven; any status may transition to any other. The only
/// transition with a side effect is the one into [`TaskStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier of the task.
    pub id: Uuid,
    /// Short description of the work.
    pub title: String,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-text task type (e.g. "screening_review"); matched against the
    /// auto-advance allow-list.
    #[serde(rename = "type")]
    pub task_type: String,
    /// The candidate this task concerns, if any.
    #[serde(default)]
    pub candidate_id: Option<Uuid>,
    /// The job this task belongs to.
    pub job_id: Uuid,
}
