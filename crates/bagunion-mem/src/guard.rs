//! RAII guard for scratch files.
//!
//! A writer holds a `ScratchGuard` for the file it is producing. Dropping the
//! guard removes the file unless `commit` was called, so an error (or panic)
//! mid-write never leaves a truncated run behind.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ScratchGuard {
    path: PathBuf,
    armed: bool,
}

impl ScratchGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file; the guard no longer removes it on drop.
    pub fn commit(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best effort: the file may not have been created yet.
            let _ = fs::remove_file(&self.path);
            #[cfg(feature = "tracing")]
            tracing::debug!(path = %self.path.display(), "removed uncommitted scratch file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("bagunion-guard-tests");
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, b"partial").unwrap();
        p
    }

    #[test]
    fn drop_removes_uncommitted_file() {
        let p = temp_file("uncommitted.tmp");
        {
            let g = ScratchGuard::new(&p);
            assert_eq!(g.path(), p.as_path());
        }
        assert!(!p.exists());
    }

    #[test]
    fn commit_keeps_file() {
        let p = temp_file("committed.tmp");
        let kept = ScratchGuard::new(&p).commit();
        assert_eq!(kept, p);
        assert!(p.exists());
        fs::remove_file(p).unwrap();
    }
}
