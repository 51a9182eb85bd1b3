//! Stage-movement audit history types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, IntoStaticStr};
use uuid::Uuid;

/// Why a job application moved between stages.
///
/// Every move carries exactly one reason. Reasons are descriptive audit
/// metadata; the client never branches on them beyond default selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageChangeReason {
    /// A user moved the application by hand.
    ManualMove,
    /// The SDK or a server-side rule moved the application.
    AutomatedMove,
    /// The application was submitted and entered the pipeline.
    ApplicationSubmitted,
    /// A user dragged the application card to another stage column.
    DragDrop,
    /// An interview finished with a passing result.
    InterviewCompleted,
    /// An interview finished with a failing result.
    InterviewFailed,
    /// A linked task was completed.
    TaskCompleted,
    /// The candidate accepted an offer.
    OfferAccepted,
    /// The candidate rejected an offer.
    OfferRejected,
    /// The candidate withdrew their application.
    CandidateWithdrawn,
    /// The company rejected the application.
    RejectedByCompany,
    /// A system-level data correction.
    SystemUpdate,
}

/// Immutable audit record of one stage move.
///
/// Created server-side as a side effect of every move; never created,
/// mutated, or deleted by this SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMovementHistoryEntry {
    /// Unique identifier of the audit record.
    pub id: Uuid,
    /// The application that moved.
    pub application_id: Uuid,
    /// The stage the application left, absent for the initial entry.
    #[serde(default)]
    pub from_stage_id: Option<Uuid>,
    /// The stage the application entered.
    pub to_stage_id: Uuid,
    /// Why the move happened.
    pub reason: StageChangeReason,
    /// Free-text notes attached to the move.
    #[serde(default)]
    pub notes: Option<String>,
    /// Free-form metadata bag (trigger type, source entity ids).
    #[serde(default)]
    pub metadata: Option<Value>,
    /// The user who performed the move, absent for automated moves.
    #[serde(default)]
    pub changed_by_id: Option<Uuid>,
    /// Hours spent in the previous stage, computed server-side.
    #[serde(default)]
    pub time_in_previous_stage_hours: Option<f64>,
    /// When the move happened.
    pub changed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&StageChangeReason::TaskCompleted).unwrap();
        assert_eq!(json, "\"task_completed\"");
        let parsed: StageChangeReason = serde_json::from_str("\"drag_drop\"").unwrap();
        assert_eq!(parsed, StageChangeReason::DragDrop);
    }

    #[test]
    fn test_reason_as_ref_matches_wire_form() {
        assert_eq!(StageChangeReason::InterviewFailed.as_ref(), "interview_failed");
    }
}
