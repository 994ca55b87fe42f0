use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Canonical result for every engine layer below the driver.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed record: line has {len} chars, expected at least {expected}")]
    MalformedRecord { len: usize, expected: usize },

    #[error("cannot merge an empty run set")]
    EmptyRunSet,

    #[error("cannot open {}: {source}", path.display())]
    MissingOrUnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Wraps a record-level failure with the file and 1-based line it came from.
    #[error("{}:{line}: {source}", path.display())]
    AtLine {
        path: PathBuf,
        line: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::MissingOrUnreadableFile {
            path: path.into(),
            source,
        }
    }

    /// Attach a file/line location to this error.
    pub fn at_line(self, path: impl Into<PathBuf>, line: u64) -> Self {
        Error::AtLine {
            path: path.into(),
            line,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through location wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_malformed_record(&self) -> bool {
        matches!(self.root(), Error::MalformedRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_line_keeps_root_and_location() {
        let err = Error::MalformedRecord {
            len: 12,
            expected: crate::record::RECORD_WIDTH,
        }
        .at_line("/tmp/t1.txt", 7);

        assert!(err.is_malformed_record());
        let msg = err.to_string();
        assert!(msg.starts_with("/tmp/t1.txt:7:"), "{msg}");
        assert!(msg.contains("12 chars"), "{msg}");
    }

    #[test]
    fn open_error_names_the_file() {
        let err = Error::open(
            "/nope/run3.tmp",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/nope/run3.tmp"));
        assert!(!err.is_malformed_record());
    }
}
