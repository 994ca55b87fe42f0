//! Block-granularity I/O cost accounting.
//!
//! Every line read or written anywhere in the engine is reported here. A block
//! is `BLOCK_CAPACITY` records; a block is charged each time a per-phase tuple
//! counter lands on a multiple of that capacity, and `flush_partial_blocks`
//! charges the leftover partial block at a phase boundary.
//!
//! The tracker is an explicit value threaded through call sites, so each
//! pipeline (and each test) owns an isolated set of counters.

use bagunion_core::budget::BLOCK_CAPACITY;
use bagunion_core::report::IoStats;

#[derive(Debug, Clone, Default)]
pub struct IoCostTracker {
    read_tuples: u64,
    written_tuples: u64,
    blocks_read: u64,
    blocks_written: u64,
}

impl IoCostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_read(&mut self) {
        self.read_tuples += 1;
        if self.read_tuples % BLOCK_CAPACITY as u64 == 0 {
            self.blocks_read += 1;
        }
    }

    pub fn note_write(&mut self) {
        self.written_tuples += 1;
        if self.written_tuples % BLOCK_CAPACITY as u64 == 0 {
            self.blocks_written += 1;
        }
    }

    /// Charge one block for any partial read/write block, then reset the
    /// per-phase counters. Call at the end of every phase.
    pub fn flush_partial_blocks(&mut self) {
        if self.read_tuples % BLOCK_CAPACITY as u64 != 0 {
            self.blocks_read += 1;
        }
        if self.written_tuples % BLOCK_CAPACITY as u64 != 0 {
            self.blocks_written += 1;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            read_tuples = self.read_tuples,
            written_tuples = self.written_tuples,
            blocks_read = self.blocks_read,
            blocks_written = self.blocks_written,
            "flushed partial blocks"
        );
        self.read_tuples = 0;
        self.written_tuples = 0;
    }

    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Tuples read since the last flush.
    pub fn pending_reads(&self) -> u64 {
        self.read_tuples
    }

    /// Tuples written since the last flush.
    pub fn pending_writes(&self) -> u64 {
        self.written_tuples
    }

    pub fn snapshot(&self) -> IoStats {
        IoStats {
            blocks_read: self.blocks_read,
            blocks_written: self.blocks_written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_reads_charge_one_block_without_resetting() {
        let mut t = IoCostTracker::new();
        for _ in 0..39 {
            t.note_read();
        }
        assert_eq!(t.blocks_read(), 0);
        t.note_read();
        assert_eq!(t.blocks_read(), 1);
        assert_eq!(t.pending_reads(), 40);

        t.flush_partial_blocks();
        assert_eq!(t.blocks_read(), 1);
        assert_eq!(t.pending_reads(), 0);
    }

    #[test]
    fn forty_one_reads_then_flush_is_two_blocks() {
        let mut t = IoCostTracker::new();
        for _ in 0..41 {
            t.note_read();
        }
        assert_eq!(t.blocks_read(), 1);
        t.flush_partial_blocks();
        assert_eq!(t.blocks_read(), 2);
        assert_eq!(t.blocks_written(), 0);
    }

    #[test]
    fn flush_with_nothing_pending_is_free() {
        let mut t = IoCostTracker::new();
        t.flush_partial_blocks();
        t.flush_partial_blocks();
        assert_eq!(t.snapshot(), IoStats::default());
    }

    #[test]
    fn reads_and_writes_are_independent() {
        let mut t = IoCostTracker::new();
        for _ in 0..85 {
            t.note_write();
        }
        for _ in 0..3 {
            t.note_read();
        }
        t.flush_partial_blocks();
        assert_eq!(t.blocks_written(), 3);
        assert_eq!(t.blocks_read(), 1);
    }

    #[test]
    fn counters_accumulate_across_phases() {
        let mut t = IoCostTracker::new();
        for _ in 0..10 {
            t.note_write();
        }
        t.flush_partial_blocks();
        let mid = t.snapshot();
        for _ in 0..50 {
            t.note_write();
        }
        t.flush_partial_blocks();
        assert_eq!(t.blocks_written(), 3);
        assert_eq!(t.snapshot().since(mid).blocks_written, 2);
    }
}
