#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod movement;
pub mod types;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use movement::mock::{MockConfig, MockProvider};
pub use movement::{
    BulkMoveOutcome, BulkMoveRequest, MoveStageRequest, StageMovementProvider,
    StageMovementService, StatsTimeframe,
};

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use types::{
    ApplicationStatus, JobApplication, Pipeline, PipelineStage, StageChangeReason,
    StageConversion, StageMovementHistoryEntry, StageMovementStats, StageTimeStats, Task,
    TaskStatus,
};
