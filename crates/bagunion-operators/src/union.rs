//! Bag-union merge of two sorted relations.
//!
//! Precondition: both inputs are sorted ascending by canonical form (the
//! output of `RunMerger`). One forward pass over each input; every distinct
//! key is emitted once with the sum of its multiplicities on both sides.

use std::cmp::Ordering;
use std::path::Path;

use bagunion_core::error::{Error, Result};
use bagunion_core::record::Record;
use bagunion_core::report::MergeMetrics;
use bagunion_io::buf::RecordReader;
use bagunion_io::writers::union::UnionSink;
use bagunion_mem::tracking::IoCostTracker;

#[derive(Debug, Clone, Copy, Default)]
pub struct BagUnionMerger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Both,
}

impl BagUnionMerger {
    pub fn new() -> Self {
        Self
    }

    /// Stream `left` and `right` into `sink` as `(key, count)` pairs in key
    /// order, then close the phase with a partial-block flush.
    pub fn merge<S: UnionSink + ?Sized>(
        &self,
        left: impl AsRef<Path>,
        right: impl AsRef<Path>,
        sink: &mut S,
        io: &mut IoCostTracker,
    ) -> Result<MergeMetrics> {
        let mut a = Cursor::open(left.as_ref(), io)?;
        let mut b = Cursor::open(right.as_ref(), io)?;
        let mut distinct = 0u64;

        loop {
            let side = match (a.head(), b.head()) {
                (None, None) => break,
                (Some(_), None) => Side::Left,
                (None, Some(_)) => Side::Right,
                (Some(x), Some(y)) => match x.cmp(y) {
                    Ordering::Less => Side::Left,
                    Ordering::Greater => Side::Right,
                    Ordering::Equal => Side::Both,
                },
            };

            let (key, count) = match side {
                Side::Left => a.take_group(io)?,
                Side::Right => b.take_group(io)?,
                Side::Both => {
                    let (key, c1) = a.take_group(io)?;
                    let (_, c2) = b.take_group(io)?;
                    (key, c1 + c2)
                }
            };
            sink.emit(&key, count, io)?;
            distinct += 1;
        }

        io.flush_partial_blocks();
        let metrics = MergeMetrics::from_distinct(distinct);

        #[cfg(feature = "tracing")]
        tracing::info!(
            distinct_tuples = metrics.distinct_tuples,
            output_blocks = metrics.output_blocks,
            "bag union merged"
        );

        Ok(metrics)
    }
}

/// A sorted input with one record of lookahead.
struct Cursor {
    reader: RecordReader,
    head: Option<Record>,
}

impl Cursor {
    fn open(path: &Path, io: &mut IoCostTracker) -> Result<Self> {
        let mut reader = RecordReader::open(path)?;
        let head = reader.next_record(io)?;
        Ok(Self { reader, head })
    }

    fn head(&self) -> Option<&Record> {
        self.head.as_ref()
    }

    /// Consume the maximal run of records equal to the head and count it.
    /// Leaves the first differing record (if any) as the new head.
    fn take_group(&mut self, io: &mut IoCostTracker) -> Result<(Record, u64)> {
        let key = self
            .head
            .take()
            .ok_or_else(|| Error::Invariant("take_group on exhausted input".into()))?;
        let mut count = 1u64;
        loop {
            match self.reader.next_record(io)? {
                Some(next) if next == key => count += 1,
                Some(next) if next < key => {
                    return Err(Error::Invariant(format!(
                        "{} is not sorted at line {}",
                        self.reader.path().display(),
                        self.reader.line_no()
                    )))
                }
                next => {
                    self.head = next;
                    return Ok((key, count));
                }
            }
        }
    }
}
