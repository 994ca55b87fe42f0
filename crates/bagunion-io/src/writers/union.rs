//! Sinks for bag-union output.
//!
//! Each emitted entry becomes one `<canonical record>:<count>` line. A
//! `FileUnionSink` streams lines to disk as they are produced; a
//! `MemoryUnionSink` keeps them in order so the caller can time the merge
//! separately from the write and persist once at the end.

use std::path::{Path, PathBuf};

use bagunion_core::error::Result;
use bagunion_core::record::Record;
use bagunion_mem::tracking::IoCostTracker;

use crate::buf::RecordWriter;

/// Render one output line (without the newline).
pub fn format_entry(key: &Record, count: u64) -> String {
    format!("{}:{}", key.encode(), count)
}

/// Destination for `(key, count)` pairs in ascending key order.
pub trait UnionSink {
    fn emit(&mut self, key: &Record, count: u64, io: &mut IoCostTracker) -> Result<()>;
}

/// Streams entries straight to an output file.
pub struct FileUnionSink {
    writer: RecordWriter,
}

impl FileUnionSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            writer: RecordWriter::create(path)?,
        })
    }

    /// Flush and keep the output. Returns its path and line count.
    pub fn finish(self) -> Result<(PathBuf, u64)> {
        self.writer.finish()
    }
}

impl UnionSink for FileUnionSink {
    fn emit(&mut self, key: &Record, count: u64, io: &mut IoCostTracker) -> Result<()> {
        self.writer.write_line(&format_entry(key, count), io)
    }
}

/// Buffers entries in memory. Writes are charged when `persist` runs.
#[derive(Debug, Default)]
pub struct MemoryUnionSink {
    lines: Vec<String>,
}

impl MemoryUnionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Write every buffered line to `path` and close the phase.
    pub fn persist(
        &self,
        path: impl AsRef<Path>,
        io: &mut IoCostTracker,
    ) -> Result<(PathBuf, u64)> {
        let mut writer = RecordWriter::create(path)?;
        for line in &self.lines {
            writer.write_line(line, io)?;
        }
        let done = writer.finish()?;
        io.flush_partial_blocks();
        Ok(done)
    }
}

impl UnionSink for MemoryUnionSink {
    fn emit(&mut self, key: &Record, count: u64, _io: &mut IoCostTracker) -> Result<()> {
        self.lines.push(format_entry(key, count));
        Ok(())
    }
}
