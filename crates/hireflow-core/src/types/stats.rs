//! Aggregate stage-movement metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-stage timing metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTimeStats {
    /// The stage these metrics describe.
    pub stage_id: Uuid,
    /// Display name of the stage at aggregation time.
    pub stage_name: String,
    /// Average hours applications spend in this stage.
    pub average_hours_in_stage: f64,
    /// How many applications are currently in this stage.
    pub current_count: u64,
}

/// Conversion rate between two adjacent stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConversion {
    /// The stage applications convert from.
    pub from_stage_id: Uuid,
    /// The stage applications convert to.
    pub to_stage_id: Uuid,
    /// Fraction of applications that made the transition, in `0.0..=1.0`.
    pub rate: f64,
}

/// Aggregate stage-movement metrics for one pipeline, computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMovementStats {
    /// The pipeline these metrics describe.
    pub pipeline_id: Uuid,
    /// Timing metrics per stage.
    #[serde(default)]
    pub stage_times: Vec<StageTimeStats>,
    /// Conversion rates between adjacent stages.
    #[serde(default)]
    pub conversions: Vec<StageConversion>,
    /// Stages where applications most often leave the pipeline, keyed by
    /// stage id with the dropoff count as value.
    #[serde(default)]
    pub dropoffs: HashMap<Uuid, u64>,
    /// Total number of stage moves in the queried timeframe.
    #[serde(default)]
    pub total_movements: u64,
}
