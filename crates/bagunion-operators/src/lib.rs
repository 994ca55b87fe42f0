#![forbid(unsafe_code)]
//! bagunion-operators: the external-sort and bag-union engine.
//!
//! Design intent:
//! - Pure and synchronous; one reader or writer per open file, no threads.
//! - Every line read or written is reported to the caller's `IoCostTracker`,
//!   and each phase ends with an explicit `flush_partial_blocks`.
//! - Phase 1 (`sort`): `RunGenerator` spills sorted runs, `RunMerger` collapses
//!   them with a pluggable `MergeStrategy` until one sorted file remains.
//! - Phase 2 (`union`): `BagUnionMerger` streams two sorted relations and sums
//!   multiplicities per distinct key.

pub mod sort;
pub mod union;

pub use sort::external::{MergeOutcome, MergeState, RunMerger, SortedRelation};
pub use sort::run::{create_initial_runs, RunGenerator};
pub use sort::strategy::{strategy_for, KWayMerge, MergeStrategy, PairwiseMerge};
pub use union::BagUnionMerger;

#[cfg(test)]
pub(crate) mod test_util;
