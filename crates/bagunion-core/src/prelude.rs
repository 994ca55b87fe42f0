//! Convenient re-exports for downstream crates.

pub use crate::budget::{blocks_for_tuples, MemoryBudget, BLOCK_CAPACITY};
pub use crate::config::{EngineConfig, StrategyKind};
pub use crate::error::{Error, Result};
pub use crate::id::{PassId, RunId};
pub use crate::record::{Record, RECORD_WIDTH};
pub use crate::report::{IoStats, MergeMetrics, PhaseReport, RelationReport, RunReport};
