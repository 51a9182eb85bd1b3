//! Stage-movement request and response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::StageChangeReason;

/// Request to move one job application to another stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStageRequest {
    /// The stage to move the application into.
    pub to_stage_id: Uuid,
    /// Why the application is moving.
    pub reason: StageChangeReason,
    /// Free-text notes recorded with the audit entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-form metadata recorded with the audit entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl MoveStageRequest {
    /// Creates a new move request.
    pub fn new(to_stage_id: Uuid, reason: StageChangeReason) -> Self {
        Self {
            to_stage_id,
            reason,
            notes: None,
            metadata: None,
        }
    }

    /// Attaches notes to the request.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attaches free-form metadata to the request.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Request to move several applications to the same destination stage in a
/// single call.
///
/// The server treats the batch as a unit; no per-item success/failure
/// breakdown exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMoveRequest {
    /// The applications to move.
    pub application_ids: Vec<Uuid>,
    /// The stage to move every application into.
    pub to_stage_id: Uuid,
    /// Why the applications are moving.
    pub reason: StageChangeReason,
}

impl BulkMoveRequest {
    /// Creates a new bulk move request.
    pub fn new(
        application_ids: Vec<Uuid>,
        to_stage_id: Uuid,
        reason: StageChangeReason,
    ) -> Self {
        Self {
            application_ids,
            to_stage_id,
            reason,
        }
    }
}

/// Server acknowledgement of a bulk move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMoveOutcome {
    /// How many applications the server moved.
    pub moved_count: u64,
}

/// Optional time window for stage-movement statistics queries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTimeframe {
    /// Inclusive start of the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    /// Exclusive end of the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
}

impl StatsTimeframe {
    /// Creates a timeframe covering `from..to`.
    pub fn new(from: Timestamp, to: Timestamp) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Creates a timeframe open on the right.
    pub fn since(from: Timestamp) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_omits_absent_fields() {
        let request = MoveStageRequest::new(Uuid::new_v4(), StageChangeReason::ManualMove);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("notes").is_none());
        assert!(json.get("metadata").is_none());
        assert_eq!(json["reason"], "manual_move");
    }

    #[test]
    fn test_move_request_builders() {
        let request = MoveStageRequest::new(Uuid::new_v4(), StageChangeReason::DragDrop)
            .with_notes("moved on the board")
            .with_metadata(serde_json::json!({ "column": "Offer" }));
        assert_eq!(request.notes.as_deref(), Some("moved on the board"));
        assert_eq!(request.metadata.unwrap()["column"], "Offer");
    }
}
