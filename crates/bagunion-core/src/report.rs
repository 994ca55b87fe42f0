//! Metrics and run reports handed back to callers.
//!
//! The driver emits a `RunReport` after a successful pipeline; nothing here
//! is persisted by the engine itself.

use serde::{Deserialize, Serialize};

use crate::budget::{blocks_for_tuples, MemoryBudget};
use crate::config::StrategyKind;

/// Summary of a bag-union merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeMetrics {
    /// Distinct keys written to the output.
    pub distinct_tuples: u64,
    /// `ceil(distinct_tuples / BLOCK_CAPACITY)`.
    pub output_blocks: u64,
}

impl MergeMetrics {
    pub fn from_distinct(distinct_tuples: u64) -> Self {
        Self {
            distinct_tuples,
            output_blocks: blocks_for_tuples(distinct_tuples),
        }
    }
}

/// Cumulative block counters at some point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoStats {
    pub blocks_read: u64,
    pub blocks_written: u64,
}

impl IoStats {
    /// Blocks accumulated between `earlier` and `self`.
    pub fn since(self, earlier: IoStats) -> IoStats {
        IoStats {
            blocks_read: self.blocks_read.saturating_sub(earlier.blocks_read),
            blocks_written: self.blocks_written.saturating_sub(earlier.blocks_written),
        }
    }

    pub fn total(self) -> u64 {
        self.blocks_read + self.blocks_written
    }
}

/// One timed phase of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub elapsed_ms: u64,
    pub io: IoStats,
}

/// Phase 1 outcome for one relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationReport {
    pub input: String,
    pub sorted: String,
    pub records: u64,
    pub runs_generated: usize,
    pub merge_passes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Engine version string for provenance.
    pub engine_version: String,
    pub budget: MemoryBudget,
    pub strategy: StrategyKind,
    pub relations: Vec<RelationReport>,
    pub phases: Vec<PhaseReport>,
    /// Output file, if the result was persisted by the engine.
    pub output: Option<String>,
    pub metrics: MergeMetrics,
    /// Totals across all phases.
    pub io: IoStats,
}

impl RunReport {
    pub fn new(budget: MemoryBudget, strategy: StrategyKind) -> Self {
        Self {
            engine_version: crate::VERSION.to_string(),
            budget,
            strategy,
            relations: Vec::new(),
            phases: Vec::new(),
            output: None,
            metrics: MergeMetrics::default(),
            io: IoStats::default(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.phases.iter().map(|p| p.elapsed_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_round_blocks_up() {
        let m = MergeMetrics::from_distinct(81);
        assert_eq!(m.output_blocks, 3);
        assert_eq!(MergeMetrics::from_distinct(0).output_blocks, 0);
    }

    #[test]
    fn io_stats_delta() {
        let before = IoStats { blocks_read: 3, blocks_written: 1 };
        let after = IoStats { blocks_read: 10, blocks_written: 4 };
        assert_eq!(after.since(before), IoStats { blocks_read: 7, blocks_written: 3 });
        assert_eq!(after.total(), 14);
    }

    #[test]
    fn report_serializes() {
        let mut r = RunReport::new(MemoryBudget::with_records(80), StrategyKind::Kway);
        r.phases.push(PhaseReport {
            phase: "bag-union".into(),
            elapsed_ms: 5,
            io: IoStats::default(),
        });
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"strategy\":\"kway\""));
        assert_eq!(r.elapsed_ms(), 5);
    }
}
