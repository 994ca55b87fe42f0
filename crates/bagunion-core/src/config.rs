//! Engine configuration that downstream crates can serialize/deserialize.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::budget::MemoryBudget;
use crate::error::{Error, Result};

/// Which merge strategy Phase 1 uses to collapse runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Bounded fan-in k-way merge over a min-heap.
    #[default]
    Kway,
    /// Adjacent pairs merged with a two-pointer merge.
    Pairwise,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Kway => "kway",
            StrategyKind::Pairwise => "pairwise",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kway" | "k-way" => Ok(StrategyKind::Kway),
            "pairwise" | "two-way" => Ok(StrategyKind::Pairwise),
            other => Err(Error::Config(format!("unknown merge strategy '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Memory limit (bytes) the record budget and fan-in are derived from.
    pub mem_limit_bytes: u64,

    /// Directory for run files and other scratch artifacts.
    pub scratch_dir: String,

    /// Merge strategy for Phase 1.
    pub strategy: StrategyKind,

    /// Buffer bag-union output lines in memory and write them once at the end,
    /// instead of streaming them to the output file.
    pub buffered_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mem_limit_bytes: 64 * 1024 * 1024, // 64 MiB default
            scratch_dir: std::env::temp_dir()
                .join("bagunion-scratch")
                .to_string_lossy()
                .into_owned(),
            strategy: StrategyKind::Kway,
            buffered_output: false,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `BAGUNION_MEM_LIMIT_BYTES`: memory limit in bytes
    /// - `BAGUNION_SCRATCH_DIR`: scratch directory for run files
    /// - `BAGUNION_STRATEGY`: `kway` or `pairwise`
    /// - `BAGUNION_BUFFERED_OUTPUT`: `1`/`true` to buffer union output
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary source.
    /// Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup("BAGUNION_MEM_LIMIT_BYTES") {
            if let Ok(v) = s.trim().parse::<u64>() {
                cfg.mem_limit_bytes = v;
            }
        }

        if let Some(s) = lookup("BAGUNION_SCRATCH_DIR") {
            if !s.trim().is_empty() {
                cfg.scratch_dir = s;
            }
        }

        if let Some(s) = lookup("BAGUNION_STRATEGY") {
            if let Ok(v) = s.parse::<StrategyKind>() {
                cfg.strategy = v;
            }
        }

        if let Some(s) = lookup("BAGUNION_BUFFERED_OUTPUT") {
            cfg.buffered_output = matches!(s.trim(), "1" | "true" | "yes");
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.mem_limit_bytes == 0 {
            return Err(Error::Config("mem_limit_bytes must be > 0".into()));
        }
        if self.scratch_dir.trim().is_empty() {
            return Err(Error::Config("scratch_dir must not be empty".into()));
        }
        Ok(())
    }

    /// Record budget and fan-in for this config.
    pub fn budget(&self) -> MemoryBudget {
        MemoryBudget::from_limit(self.mem_limit_bytes)
    }
}
