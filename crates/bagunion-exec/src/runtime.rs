//! Runtime: drive both phases of a bag union and emit a `RunReport`.
//!
//! Behavior:
//! - Derives the memory budget and fan-in once, from `EngineConfig`.
//! - Phase 1 sorts each relation into `<scratch_dir>/<prefix>_sorted.txt`.
//! - Phase 2 merges the two sorted files into the requested output, streaming
//!   or buffered depending on `EngineConfig::buffered_output`.
//! - Each phase is timed and charged its own block delta from the engine's
//!   `IoCostTracker`.
//! - On failure, live run files of the failing relation are removed; the
//!   error names the phase it happened in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use bagunion_core::budget::MemoryBudget;
use bagunion_core::config::EngineConfig;
use bagunion_core::report::{IoStats, MergeMetrics, PhaseReport, RelationReport, RunReport};

use bagunion_io::buf::RecordWriter;
use bagunion_io::writers::union::{FileUnionSink, MemoryUnionSink};
use bagunion_mem::spill::RunStore;
use bagunion_mem::tracking::IoCostTracker;
use bagunion_operators::{create_initial_runs, BagUnionMerger, RunMerger};

use crate::metrics;

/// Pipeline stage an error or report line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Standalone sort of a single relation.
    Sort,
    SortLeft,
    SortRight,
    BagUnion,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Sort => "sort",
            Phase::SortLeft => "sort-left",
            Phase::SortRight => "sort-right",
            Phase::BagUnion => "bag-union",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{phase} failed: {source}")]
    Phase {
        phase: Phase,
        source: bagunion_core::Error,
    },
}

impl ExecError {
    /// The phase that failed, if the error came from the pipeline.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ExecError::Phase { phase, .. } => Some(*phase),
            ExecError::Config(_) => None,
        }
    }

    /// Underlying engine error with location wrappers removed.
    pub fn engine_error(&self) -> Option<&bagunion_core::Error> {
        match self {
            ExecError::Phase { source, .. } => Some(source.root()),
            ExecError::Config(_) => None,
        }
    }
}

/// Engine owns the configuration, the derived budget, and the I/O tracker.
pub struct Engine {
    cfg: EngineConfig,
    budget: MemoryBudget,
    io: IoCostTracker,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Result<Self, ExecError> {
        cfg.validate()
            .map_err(|e| ExecError::Config(e.to_string()))?;
        let budget = cfg.budget();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            mem_limit_bytes = cfg.mem_limit_bytes,
            budget_records = budget.records,
            fan_in = budget.fan_in,
            strategy = %cfg.strategy,
            "engine configured"
        );

        Ok(Self {
            cfg,
            budget,
            io: IoCostTracker::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }

    /// Cumulative blocks charged by this engine so far.
    pub fn io_stats(&self) -> IoStats {
        self.io.snapshot()
    }

    fn scratch_dir(&self) -> PathBuf {
        PathBuf::from(&self.cfg.scratch_dir)
    }

    /// Externally sort one relation into `output` (Phase 1 only).
    pub fn sort(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<RunReport, ExecError> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let start = self.io.snapshot();
        let mut report = RunReport::new(self.budget, self.cfg.strategy);
        let prefix = run_prefix(input);

        let relation = self.timed(Phase::Sort, &mut report.phases, |engine| {
            engine.sort_relation(input, output, &prefix)
        })?;
        report.relations.push(relation);
        report.output = Some(output.display().to_string());
        report.io = self.io.snapshot().since(start);
        Ok(report)
    }

    /// Sort both relations and write their bag union to `output`.
    pub fn bag_union(
        &mut self,
        left: impl AsRef<Path>,
        right: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<RunReport, ExecError> {
        let (left, right, output) = (left.as_ref(), right.as_ref(), output.as_ref());
        let start = self.io.snapshot();
        let mut report = RunReport::new(self.budget, self.cfg.strategy);

        let scratch = self.scratch_dir();
        let sorted_left = scratch.join("T1_sorted.txt");
        let sorted_right = scratch.join("T2_sorted.txt");

        let relation = self.timed(Phase::SortLeft, &mut report.phases, |engine| {
            engine.sort_relation(left, &sorted_left, "T1")
        })?;
        report.relations.push(relation);

        let relation = self.timed(Phase::SortRight, &mut report.phases, |engine| {
            engine.sort_relation(right, &sorted_right, "T2")
        })?;
        report.relations.push(relation);

        report.metrics = self.timed(Phase::BagUnion, &mut report.phases, |engine| {
            engine.union_into(&sorted_left, &sorted_right, output)
        })?;
        report.output = Some(output.display().to_string());
        report.io = self.io.snapshot().since(start);

        #[cfg(feature = "tracing")]
        tracing::info!(
            output = %output.display(),
            distinct_tuples = report.metrics.distinct_tuples,
            blocks_read = report.io.blocks_read,
            blocks_written = report.io.blocks_written,
            elapsed_ms = report.elapsed_ms(),
            "bag union complete"
        );

        Ok(report)
    }

    /// Run `f` as one phase: time it, charge it the block delta, and tag any
    /// error with the phase.
    fn timed<T>(
        &mut self,
        phase: Phase,
        phases: &mut Vec<PhaseReport>,
        f: impl FnOnce(&mut Self) -> bagunion_core::Result<T>,
    ) -> Result<T, ExecError> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("phase", phase = phase.as_str());
        #[cfg(feature = "tracing")]
        let _entered = span.enter();

        let started = Instant::now();
        let before = self.io.snapshot();
        let value = f(self).map_err(|source| ExecError::Phase { phase, source })?;

        let report = PhaseReport {
            phase: phase.to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            io: self.io.snapshot().since(before),
        };
        metrics::emit_phase(&report);
        phases.push(report);
        Ok(value)
    }

    fn sort_relation(
        &mut self,
        input: &Path,
        output: &Path,
        prefix: &str,
    ) -> bagunion_core::Result<RelationReport> {
        let mut store = RunStore::new(self.scratch_dir(), prefix)?;
        let result = self.sort_with_store(input, output, &mut store);
        if result.is_err() {
            // Cleanup failures are ignored; the sort error is returned.
            let _ = store.cleanup();
        }
        result
    }

    fn sort_with_store(
        &mut self,
        input: &Path,
        output: &Path,
        store: &mut RunStore,
    ) -> bagunion_core::Result<RelationReport> {
        let runs = create_initial_runs(input, self.budget.records, store, &mut self.io)?;
        let runs_generated = runs.len();

        let (records, merge_passes) = if runs.is_empty() {
            // Nothing to merge: an empty relation sorts to an empty file.
            RecordWriter::create(output)?.finish()?;
            (0, 0)
        } else {
            let mut merger = RunMerger::from_config(self.cfg.strategy, &self.budget);
            let outcome = merger.merge_runs(runs, output, store, &mut self.io)?;
            (outcome.sorted.records, outcome.passes)
        };

        Ok(RelationReport {
            input: input.display().to_string(),
            sorted: output.display().to_string(),
            records,
            runs_generated,
            merge_passes,
        })
    }

    fn union_into(
        &mut self,
        left: &Path,
        right: &Path,
        output: &Path,
    ) -> bagunion_core::Result<MergeMetrics> {
        let merger = BagUnionMerger::new();
        if self.cfg.buffered_output {
            let mut sink = MemoryUnionSink::new();
            let metrics = merger.merge(left, right, &mut sink, &mut self.io)?;
            sink.persist(output, &mut self.io)?;
            Ok(metrics)
        } else {
            let mut sink = FileUnionSink::create(output)?;
            let metrics = merger.merge(left, right, &mut sink, &mut self.io)?;
            sink.finish()?;
            Ok(metrics)
        }
    }
}

/// Run-file prefix for a standalone sort: the input's file stem.
fn run_prefix(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "run".to_string())
}
