#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod key;
mod mutation;
mod patch;
mod store;

pub use key::{QueryKey, keys_touched_by_bulk_move, keys_touched_by_move};
pub use mutation::{OptimisticStageMove, StageMoveMutation};
pub use store::{CacheSnapshot, MutationState, QueryCache};
