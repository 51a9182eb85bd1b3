//! Stage-movement operations: provider trait, request types, and the
//! observable service wrapper.

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
mod provider;
mod request;
mod service;

pub use provider::StageMovementProvider;
pub use request::{BulkMoveOutcome, BulkMoveRequest, MoveStageRequest, StatsTimeframe};
pub use service::StageMovementService;

/// Tracing target for stage-movement operations.
pub const TRACING_TARGET: &str = "hireflow_core::movement";
