//! Record counter: lines in a file and the blocks they occupy.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use bagunion_core::budget::blocks_for_tuples;
use bagunion_core::error::{Error, Result};

use crate::buf::DEFAULT_BUF_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCount {
    pub records: u64,
    pub blocks: u64,
}

/// Count lines (a final line without `\n` still counts). Content is not
/// decoded, so malformed lines are counted too.
pub fn count_records(path: impl AsRef<Path>) -> Result<RecordCount> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::open(path, e))?;
    let mut reader = BufReader::with_capacity(DEFAULT_BUF_CAPACITY, file);
    let mut buf = Vec::new();
    let mut records = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::io(path, e))?;
        if n == 0 {
            break;
        }
        records += 1;
    }
    Ok(RecordCount {
        records,
        blocks: blocks_for_tuples(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_lines_and_blocks() {
        let dir = std::env::temp_dir().join("bagunion-count-tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lines.txt");
        let body: String = (0..41).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, format!("{body}no newline")).unwrap();

        let c = count_records(&path).unwrap();
        assert_eq!(c.records, 42);
        assert_eq!(c.blocks, 2);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_file_is_zero() {
        let dir = std::env::temp_dir().join("bagunion-count-tests-empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.txt");
        std::fs::write(&path, "").unwrap();
        assert_eq!(count_records(&path).unwrap(), RecordCount { records: 0, blocks: 0 });
        let _ = std::fs::remove_dir_all(dir);
    }
}
