//! Buffered, line-oriented record readers and writers.
//!
//! Both wrap `BufReader`/`BufWriter` with an explicit capacity to bound the
//! in-flight buffer, and both report every line to the caller's
//! `IoCostTracker`. Files are closed when the value is dropped; a writer that
//! is dropped without `finish` also removes its half-written file.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use bagunion_core::budget::BLOCK_CAPACITY;
use bagunion_core::error::{Error, Result};
use bagunion_core::record::{Record, RECORD_WIDTH};
use bagunion_mem::guard::ScratchGuard;
use bagunion_mem::tracking::IoCostTracker;

/// Default per-file buffer (bytes).
pub const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

/// Buffer for a sorted run: one block of newline-terminated records. The merge
/// fan-in is sized so that one such buffer per open run fits the budget.
pub const RUN_BUF_CAPACITY: usize = BLOCK_CAPACITY * (RECORD_WIDTH + 1);

/// Sequential reader over a one-record-per-line file.
pub struct RecordReader {
    inner: BufReader<File>,
    path: PathBuf,
    line_no: u64,
    line: String,
}

impl RecordReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(DEFAULT_BUF_CAPACITY, path)
    }

    /// Open a run file with a one-block buffer.
    pub fn open_run(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(RUN_BUF_CAPACITY, path)
    }

    /// Open with a fixed internal buffer size. Missing or unreadable files are
    /// reported as `MissingOrUnreadableFile`.
    pub fn with_capacity(capacity: usize, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::open(&path, e))?;
        Ok(Self {
            inner: BufReader::with_capacity(capacity, file),
            path,
            line_no: 0,
            line: String::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// 1-based number of the last line returned.
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Next raw line without its `\n`, or `None` at end of file.
    pub fn read_line(&mut self, io: &mut IoCostTracker) -> Result<Option<&str>> {
        self.line.clear();
        let n = self
            .inner
            .read_line(&mut self.line)
            .map_err(|e| Error::io(&self.path, e))?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        io.note_read();
        if self.line.ends_with('\n') {
            self.line.pop();
        }
        Ok(Some(&self.line))
    }

    /// Next decoded record, or `None` at end of file. Decode failures carry
    /// the file path and line number.
    pub fn next_record(&mut self, io: &mut IoCostTracker) -> Result<Option<Record>> {
        let decoded = match self.read_line(io)? {
            None => return Ok(None),
            Some(line) => Record::decode(line),
        };
        decoded
            .map(Some)
            .map_err(|e| e.at_line(&self.path, self.line_no))
    }
}

/// Sequential writer producing a one-line-per-entry file.
pub struct RecordWriter {
    inner: BufWriter<File>,
    guard: ScratchGuard,
    written: u64,
}

impl RecordWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(DEFAULT_BUF_CAPACITY, path)
    }

    pub fn create_run(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(RUN_BUF_CAPACITY, path)
    }

    /// Create (or truncate) `path`, creating parent directories if needed.
    pub fn with_capacity(capacity: usize, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            inner: BufWriter::with_capacity(capacity, file),
            guard: ScratchGuard::new(path),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        self.guard.path()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Lines written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_record(&mut self, record: &Record, io: &mut IoCostTracker) -> Result<()> {
        self.write_line(record.encode(), io)
    }

    pub fn write_line(&mut self, line: &str, io: &mut IoCostTracker) -> Result<()> {
        self.inner
            .write_all(line.as_bytes())
            .and_then(|_| self.inner.write_all(b"\n"))
            .map_err(|e| Error::io(self.guard.path(), e))?;
        self.written += 1;
        io.note_write();
        Ok(())
    }

    /// Flush and keep the file. Returns its path and line count.
    pub fn finish(mut self) -> Result<(PathBuf, u64)> {
        self.inner
            .flush()
            .map_err(|e| Error::io(self.guard.path(), e))?;
        let written = self.written;
        Ok((self.guard.commit(), written))
    }
}
