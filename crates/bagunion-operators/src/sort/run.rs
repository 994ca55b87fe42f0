//! Run generation utilities for external sort.
//!
//! Accumulates records in memory (up to the record budget), sorts them, and
//! spills each full buffer to a new run file.

use std::path::Path;

use bagunion_core::error::Result;
use bagunion_core::record::Record;
use bagunion_io::buf::{RecordReader, RecordWriter};
use bagunion_mem::spill::{RunMeta, RunStore};
use bagunion_mem::tracking::IoCostTracker;

/// Upper bound on the up-front buffer reservation; larger budgets grow lazily.
const MAX_PREALLOC_RECORDS: usize = 1 << 20;

/// Generator for sorted runs.
///
/// Accumulates records, sorts when the budget is reached, writes to a run.
pub struct RunGenerator {
    budget_records: usize,
    buffer: Vec<Record>,
    runs: Vec<RunMeta>,
}

impl RunGenerator {
    pub fn new(budget_records: usize) -> Self {
        let budget_records = budget_records.max(1);
        Self {
            budget_records,
            buffer: Vec::with_capacity(budget_records.min(MAX_PREALLOC_RECORDS)),
            runs: Vec::new(),
        }
    }

    /// Add a record to the buffer. Spills if the budget is reached.
    pub fn push(
        &mut self,
        record: Record,
        store: &mut RunStore,
        io: &mut IoCostTracker,
    ) -> Result<()> {
        self.buffer.push(record);
        if self.buffer.len() >= self.budget_records {
            self.flush_run(store, io)?;
        }
        Ok(())
    }

    /// Sort the buffer and write it to a new run on disk.
    fn flush_run(&mut self, store: &mut RunStore, io: &mut IoCostTracker) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // Equal records are indistinguishable, so stability does not matter.
        self.buffer.sort_unstable();

        let (id, name, path) = store.allocate();
        let mut writer = RecordWriter::create_run(&path)?;
        for record in &self.buffer {
            writer.write_record(record, io)?;
        }
        let (path, records) = writer.finish()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(run = %name, records, "spilled sorted run");

        self.runs.push(store.register(id, name, path, records));
        self.buffer.clear();
        Ok(())
    }

    /// Spill any remaining records and return the runs in creation order.
    pub fn finalize(
        &mut self,
        store: &mut RunStore,
        io: &mut IoCostTracker,
    ) -> Result<Vec<RunMeta>> {
        self.flush_run(store, io)?;
        Ok(std::mem::take(&mut self.runs))
    }

    /// Delete every run spilled so far (error path).
    fn discard(&mut self, store: &mut RunStore) {
        for run in self.runs.drain(..) {
            let _ = store.delete(&run);
        }
        self.buffer.clear();
    }
}

/// Read `input` sequentially and produce sorted runs of at most
/// `budget_records` records each.
///
/// An empty input yields no runs. A decode failure aborts immediately; runs
/// already spilled by this call are deleted before the error is returned.
pub fn create_initial_runs(
    input: impl AsRef<Path>,
    budget_records: usize,
    store: &mut RunStore,
    io: &mut IoCostTracker,
) -> Result<Vec<RunMeta>> {
    let mut gen = RunGenerator::new(budget_records);
    let result = fill(&mut gen, input.as_ref(), store, io);
    // Charge the last partial read/write blocks of run generation.
    io.flush_partial_blocks();
    match result {
        Ok(runs) => {
            #[cfg(feature = "tracing")]
            tracing::info!(
                input = %input.as_ref().display(),
                runs = runs.len(),
                budget_records,
                "initial runs created"
            );
            Ok(runs)
        }
        Err(e) => {
            gen.discard(store);
            Err(e)
        }
    }
}

fn fill(
    gen: &mut RunGenerator,
    input: &Path,
    store: &mut RunStore,
    io: &mut IoCostTracker,
) -> Result<Vec<RunMeta>> {
    let mut reader = RecordReader::open(input)?;
    while let Some(record) = reader.next_record(io)? {
        gen.push(record, store, io)?;
    }
    gen.finalize(store, io)
}
