//! Multi-pass run merging.
//!
//! `RunMerger` repeatedly partitions the live run list into groups of at most
//! `fan_in` runs and merges each group into one new run, until a single run
//! remains. That run is then adopted as the sorted relation.
//!
//! State machine:
//!
//! ```text
//! AwaitingRuns -> Merging(pass 1) -> Merging(pass 2) -> ... -> Done
//! ```
//!
//! Consumed runs are deleted as soon as the group that read them is merged.

use std::path::{Path, PathBuf};

use bagunion_core::budget::MemoryBudget;
use bagunion_core::config::StrategyKind;
use bagunion_core::error::{Error, Result};
use bagunion_core::id::PassId;
use bagunion_io::buf::{RecordReader, RecordWriter};
use bagunion_mem::spill::{RunMeta, RunStore};
use bagunion_mem::tracking::IoCostTracker;

use super::strategy::{strategy_for, MergeStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    AwaitingRuns,
    Merging { pass: PassId },
    Done,
}

/// The single fully sorted run left for one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedRelation {
    pub path: PathBuf,
    pub records: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub sorted: SortedRelation,
    /// Merge passes performed (0 when a single run was adopted as-is).
    pub passes: u32,
}

pub struct RunMerger {
    strategy: Box<dyn MergeStrategy>,
    state: MergeState,
}

impl RunMerger {
    pub fn new(strategy: Box<dyn MergeStrategy>) -> Self {
        Self {
            strategy,
            state: MergeState::AwaitingRuns,
        }
    }

    pub fn from_config(kind: StrategyKind, budget: &MemoryBudget) -> Self {
        Self::new(strategy_for(kind, budget))
    }

    pub fn state(&self) -> MergeState {
        self.state
    }

    /// Merge `runs` down to one sorted file at `output`.
    ///
    /// Fails with `EmptyRunSet` when `runs` is empty. A single run is renamed
    /// into place without any merge work.
    pub fn merge_runs(
        &mut self,
        runs: Vec<RunMeta>,
        output: impl AsRef<Path>,
        store: &mut RunStore,
        io: &mut IoCostTracker,
    ) -> Result<MergeOutcome> {
        self.state = MergeState::AwaitingRuns;
        if runs.is_empty() {
            return Err(Error::EmptyRunSet);
        }

        let mut current = runs;
        let mut pass = 0u32;
        while current.len() > 1 {
            pass += 1;
            self.state = MergeState::Merging {
                pass: PassId::new(u64::from(pass)),
            };
            current = self.run_pass(pass, current, store, io)?;
        }

        let last = current
            .pop()
            .ok_or_else(|| Error::Invariant("merge pass produced no runs".into()))?;
        let sorted = adopt_or_copy(&last, output.as_ref(), store, io)?;
        self.state = MergeState::Done;

        #[cfg(feature = "tracing")]
        tracing::info!(
            output = %sorted.path.display(),
            records = sorted.records,
            passes = pass,
            strategy = self.strategy.name(),
            "runs merged"
        );

        Ok(MergeOutcome {
            sorted,
            passes: pass,
        })
    }

    /// One pass: merge each group of at most `fan_in` runs. A trailing group
    /// of one run is carried to the next pass untouched only when the strategy
    /// says so; otherwise it is read and rewritten like any other group.
    fn run_pass(
        &self,
        pass: u32,
        runs: Vec<RunMeta>,
        store: &mut RunStore,
        io: &mut IoCostTracker,
    ) -> Result<Vec<RunMeta>> {
        let fan_in = self.strategy.fan_in().max(2);
        let mut next = Vec::with_capacity(runs.len().div_ceil(fan_in));

        #[cfg(feature = "tracing")]
        tracing::debug!(pass, runs = runs.len(), fan_in, "merge pass started");

        for group in runs.chunks(fan_in) {
            match group {
                [single] if self.strategy.carries_singleton() => next.push(single.clone()),
                _ => next.push(self.merge_group(group, store, io)?),
            }
        }
        io.flush_partial_blocks();

        #[cfg(feature = "tracing")]
        tracing::debug!(pass, runs_out = next.len(), "merge pass finished");
        #[cfg(not(feature = "tracing"))]
        let _ = pass;

        Ok(next)
    }

    /// Merge one group into a fresh run, then delete the group's inputs.
    ///
    /// Readers live only for this call; they are closed on return whether the
    /// merge succeeded or failed.
    fn merge_group(
        &self,
        group: &[RunMeta],
        store: &mut RunStore,
        io: &mut IoCostTracker,
    ) -> Result<RunMeta> {
        let mut readers = group
            .iter()
            .map(|run| RecordReader::open_run(&run.path))
            .collect::<Result<Vec<_>>>()?;

        let (id, name, path) = store.allocate();
        let mut out = RecordWriter::create_run(&path)?;
        self.strategy.merge_group(&mut readers, &mut out, io)?;
        drop(readers);
        let (path, records) = out.finish()?;

        let expected: u64 = group.iter().map(|r| r.records).sum();
        if records != expected {
            return Err(Error::Invariant(format!(
                "merged run {name} has {records} records, inputs had {expected}"
            )));
        }

        for run in group {
            store.delete(run)?;
        }
        Ok(store.register(id, name, path, records))
    }
}

/// Move the last run to `output`; copy it line by line if a rename is not
/// possible.
fn adopt_or_copy(
    run: &RunMeta,
    output: &Path,
    store: &mut RunStore,
    io: &mut IoCostTracker,
) -> Result<SortedRelation> {
    if store.adopt(run, output)? {
        return Ok(SortedRelation {
            path: output.to_path_buf(),
            records: run.records,
        });
    }
    copy_run(run, output, store, io)
}

/// Copy `run` to `output` line by line, charging the I/O as its own phase,
/// then delete the run.
fn copy_run(
    run: &RunMeta,
    output: &Path,
    store: &mut RunStore,
    io: &mut IoCostTracker,
) -> Result<SortedRelation> {
    let mut reader = RecordReader::open_run(&run.path)?;
    let mut writer = RecordWriter::create_run(output)?;
    while let Some(line) = reader.read_line(io)? {
        writer.write_line(line, io)?;
    }
    drop(reader);
    let (path, records) = writer.finish()?;
    store.delete(run)?;
    io.flush_partial_blocks();
    Ok(SortedRelation { path, records })
}
