#![forbid(unsafe_code)]
//! bagunion-io: the only crate that opens files.
//!
//! - `buf`: buffered, line-oriented `RecordReader` / `RecordWriter`. Every
//!   line goes through an `IoCostTracker`.
//! - `writers`: sinks for bag-union output (`<record>:<count>` lines).
//! - `readers`: whole-file utilities such as the record counter.
//!
//! Access is strictly sequential: open, read/write lines, close. No seeking.

pub mod buf;
pub mod readers;
pub mod writers;

pub use buf::{RecordReader, RecordWriter, DEFAULT_BUF_CAPACITY};
pub use readers::count::{count_records, RecordCount};
pub use writers::union::{FileUnionSink, MemoryUnionSink, UnionSink};
