#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod engine;

pub use engine::{
    AdvanceOutcome, AutoAdvanceEngine, DEFAULT_ADVANCE_TASK_TYPES, SkipReason, TRACING_TARGET,
};
