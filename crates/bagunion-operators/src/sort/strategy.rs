//! Merge strategies for collapsing sorted runs.
//!
//! A strategy decides how many runs go into one group (`fan_in`) and how a
//! group of sorted readers is merged into one sorted writer. `RunMerger` owns
//! the pass loop, so every strategy shares the same contract: sorted inputs
//! in, one sorted permutation (duplicates kept) out.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bagunion_core::budget::MemoryBudget;
use bagunion_core::config::StrategyKind;
use bagunion_core::error::{Error, Result};
use bagunion_core::record::Record;
use bagunion_io::buf::{RecordReader, RecordWriter};
use bagunion_mem::tracking::IoCostTracker;

pub trait MergeStrategy {
    /// Stable strategy name (matches `StrategyKind`).
    fn name(&self) -> &'static str;

    /// Maximum number of runs merged into one output (>= 2).
    fn fan_in(&self) -> usize;

    /// Whether a pass's trailing group of one run skips to the next pass
    /// unread. When false, the lone run is rewritten like any other group.
    fn carries_singleton(&self) -> bool {
        false
    }

    /// Merge sorted `inputs` into `out`. Never deduplicates.
    fn merge_group(
        &self,
        inputs: &mut [RecordReader],
        out: &mut RecordWriter,
        io: &mut IoCostTracker,
    ) -> Result<()>;
}

/// Build the configured strategy for a budget.
pub fn strategy_for(kind: StrategyKind, budget: &MemoryBudget) -> Box<dyn MergeStrategy> {
    match kind {
        StrategyKind::Kway => Box::new(KWayMerge::new(budget.fan_in)),
        StrategyKind::Pairwise => Box::new(PairwiseMerge),
    }
}

/// Bounded fan-in k-way merge over a min-heap of reader heads.
#[derive(Debug, Clone, Copy)]
pub struct KWayMerge {
    fan_in: usize,
}

impl KWayMerge {
    pub fn new(fan_in: usize) -> Self {
        Self {
            fan_in: fan_in.max(2),
        }
    }
}

impl MergeStrategy for KWayMerge {
    fn name(&self) -> &'static str {
        "kway"
    }

    fn fan_in(&self) -> usize {
        self.fan_in
    }

    fn merge_group(
        &self,
        inputs: &mut [RecordReader],
        out: &mut RecordWriter,
        io: &mut IoCostTracker,
    ) -> Result<()> {
        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(inputs.len());

        // Prime the heap with the first record of each run.
        for (reader, input) in inputs.iter_mut().enumerate() {
            if let Some(record) = input.next_record(io)? {
                heap.push(HeapEntry { record, reader });
            }
        }

        while let Some(HeapEntry { record, reader }) = heap.pop() {
            out.write_record(&record, io)?;
            if let Some(next) = inputs[reader].next_record(io)? {
                heap.push(HeapEntry {
                    record: next,
                    reader,
                });
            }
        }
        Ok(())
    }
}

/// Entry in the merge heap.
///
/// Ordered by record (reversed for min-heap behavior); equal records are
/// tie-broken by reader index so output is deterministic.
#[derive(Debug)]
struct HeapEntry {
    record: Record,
    reader: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .record
            .cmp(&self.record)
            .then_with(|| other.reader.cmp(&self.reader))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.reader == other.reader
    }
}

impl Eq for HeapEntry {}

/// Classic two-way merge of adjacent run pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseMerge;

impl MergeStrategy for PairwiseMerge {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn fan_in(&self) -> usize {
        2
    }

    fn carries_singleton(&self) -> bool {
        true
    }

    fn merge_group(
        &self,
        inputs: &mut [RecordReader],
        out: &mut RecordWriter,
        io: &mut IoCostTracker,
    ) -> Result<()> {
        let n = inputs.len();
        let (left, right) = match inputs {
            [left, right] => (left, right),
            [only] => return drain(None, only, out, io),
            _ => {
                return Err(Error::Invariant(format!(
                    "pairwise merge expects 2 runs, got {n}"
                )))
            }
        };

        let mut a = left.next_record(io)?;
        let mut b = right.next_record(io)?;
        loop {
            match (a.take(), b.take()) {
                (Some(x), Some(y)) => {
                    if x <= y {
                        out.write_record(&x, io)?;
                        a = left.next_record(io)?;
                        b = Some(y);
                    } else {
                        out.write_record(&y, io)?;
                        b = right.next_record(io)?;
                        a = Some(x);
                    }
                }
                (Some(x), None) => return drain(Some(x), left, out, io),
                (None, Some(y)) => return drain(Some(y), right, out, io),
                (None, None) => return Ok(()),
            }
        }
    }
}

/// Write `head` (if any) and everything left in `input`.
fn drain(
    head: Option<Record>,
    input: &mut RecordReader,
    out: &mut RecordWriter,
    io: &mut IoCostTracker,
) -> Result<()> {
    if let Some(record) = head {
        out.write_record(&record, io)?;
    }
    while let Some(record) = input.next_record(io)? {
        out.write_record(&record, io)?;
    }
    Ok(())
}
