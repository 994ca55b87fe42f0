//! Run-file bookkeeping for external sorting.
//!
//! `RunStore` hands out run paths, remembers which runs are still live, and
//! deletes or adopts them once consumed. It never touches file contents; the
//! I/O layer writes and reads the lines.

pub mod segment;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bagunion_core::error::{Error, Result};
use bagunion_core::id::RunId;

pub use segment::{RunMeta, RunName};

/// Central registry for the run files of one relation.
#[derive(Debug)]
pub struct RunStore {
    root_dir: PathBuf,
    prefix: String,
    next_run: u64,
    live: BTreeMap<RunId, RunMeta>,
}

impl RunStore {
    /// Create a store rooted at `root_dir`; the directory is created if missing.
    pub fn new(root_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir).map_err(|e| Error::io(&root_dir, e))?;
        Ok(Self {
            root_dir,
            prefix: prefix.into(),
            next_run: 1,
            live: BTreeMap::new(),
        })
    }

    /// Reserve the next run id and its path. Nothing is created on disk.
    pub fn allocate(&mut self) -> (RunId, RunName, PathBuf) {
        let id = RunId::new(self.next_run);
        self.next_run += 1;
        let name = RunName::new(&self.prefix, id);
        let path = self.root_dir.join(&name.0);
        (id, name, path)
    }

    /// Record a completed run as live.
    pub fn register(&mut self, id: RunId, name: RunName, path: PathBuf, records: u64) -> RunMeta {
        let meta = RunMeta {
            id,
            name,
            path,
            records,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(run = %meta.name, records, "run registered");
        self.live.insert(id, meta.clone());
        meta
    }

    /// Delete a consumed run. Idempotent: a run already gone is not an error.
    pub fn delete(&mut self, run: &RunMeta) -> Result<()> {
        self.live.remove(&run.id);
        match fs::remove_file(&run.path) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(run = %run.name, "run deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&run.path, e)),
        }
    }

    /// Move a run to `dest`, removing it from the live set.
    ///
    /// Returns `Ok(false)` when the rename is not possible (e.g. across
    /// filesystems); the run is left in place and live so the caller can copy it.
    pub fn adopt(&mut self, run: &RunMeta, dest: &Path) -> Result<bool> {
        if !run.path.exists() {
            return Err(Error::open(
                &run.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "run file missing"),
            ));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        match fs::rename(&run.path, dest) {
            Ok(()) => {
                self.live.remove(&run.id);
                #[cfg(feature = "tracing")]
                tracing::debug!(run = %run.name, dest = %dest.display(), "run adopted");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Runs registered and not yet deleted or adopted, in id order.
    pub fn live_runs(&self) -> Vec<RunMeta> {
        self.live.values().cloned().collect()
    }

    /// Delete every live run. Used on error paths and at teardown.
    pub fn cleanup(&mut self) -> Result<()> {
        for run in self.live_runs() {
            self.delete(&run)?;
        }
        Ok(())
    }
}
