//! Memory budget derivation.
//!
//! The engine never measures live memory. A configured byte limit is turned,
//! once per pipeline run, into a record budget for run generation and a
//! fan-in for merging; both stay fixed for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::record::RECORD_WIDTH;

/// Records per block in the I/O cost model.
pub const BLOCK_CAPACITY: usize = 40;

/// Share of the byte limit assumed usable for buffered records; the rest is
/// headroom for per-record representation overhead.
pub const USABLE_NUMERATOR: u64 = 3;
pub const USABLE_DENOMINATOR: u64 = 5;

/// Fixed sizing derived from a byte limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBudget {
    /// The configured limit this budget was derived from.
    pub mem_limit_bytes: u64,
    /// Records buffered per initial run (always >= 1).
    pub records: usize,
    /// Runs merged together per k-way group (always >= 2).
    pub fan_in: usize,
}

impl MemoryBudget {
    pub fn from_limit(mem_limit_bytes: u64) -> Self {
        let usable = usable_bytes(mem_limit_bytes);
        let records = ((usable / RECORD_WIDTH as u64) as usize).max(1);
        Self {
            mem_limit_bytes,
            records,
            fan_in: fan_in_for(records),
        }
    }

    /// A budget with an explicit record count (tests and tooling).
    pub fn with_records(records: usize) -> Self {
        let records = records.max(1);
        Self {
            mem_limit_bytes: records as u64 * RECORD_WIDTH as u64,
            records,
            fan_in: fan_in_for(records),
        }
    }
}

/// `floor(bytes * 0.6)` without going through floating point.
pub fn usable_bytes(bytes: u64) -> u64 {
    bytes / USABLE_DENOMINATOR * USABLE_NUMERATOR
        + (bytes % USABLE_DENOMINATOR) * USABLE_NUMERATOR / USABLE_DENOMINATOR
}

/// One block buffer per input run plus one reserved for the output stream.
pub fn fan_in_for(budget_records: usize) -> usize {
    (budget_records / BLOCK_CAPACITY).saturating_sub(1).max(2)
}

/// `ceil(tuples / BLOCK_CAPACITY)`.
pub fn blocks_for_tuples(tuples: u64) -> u64 {
    tuples.div_ceil(BLOCK_CAPACITY as u64)
}
