#![forbid(unsafe_code)]
//! bagunion: bag union of two fixed-width record files under a memory budget.
//!
//! The engine is split across the workspace crates; this crate re-exports the
//! pieces most callers need and hosts the integration tests and benches.

pub use bagunion_core::config::{EngineConfig, StrategyKind};
pub use bagunion_core::report::{MergeMetrics, RunReport};
pub use bagunion_core::{Error, Record, Result};
pub use bagunion_exec::{Engine, ExecError};

pub use bagunion_core as core;
pub use bagunion_exec as exec;
pub use bagunion_io as io;
pub use bagunion_mem as mem;
pub use bagunion_operators as operators;
