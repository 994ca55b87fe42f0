//! Run file naming and metadata.
//!
//! Run files live at `<root>/<prefix>_run<seq>.tmp`. The sequence number comes
//! from the owning `RunStore`, so names are deterministic for a given prefix.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use bagunion_core::id::RunId;

/// Human-friendly name for a run, derived from a prefix and a sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunName(pub String);

impl RunName {
    pub fn new(prefix: &str, id: RunId) -> Self {
        RunName(format!("{}_run{}.tmp", prefix, id.get()))
    }
}

impl fmt::Display for RunName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal metadata the engine keeps for a run on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    pub id: RunId,
    pub name: RunName,
    pub path: PathBuf,
    /// Records written to the run.
    pub records: u64,
}
