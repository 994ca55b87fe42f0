#![forbid(unsafe_code)]
//! bagunion-exec: the pipeline driver.
//!
//! `Engine` runs Phase 1 (external sort) for each relation and Phase 2 (bag
//! union), times every phase, and returns a serializable `RunReport` with the
//! block counts charged to each phase.

pub mod metrics;
pub mod runtime;

pub use runtime::{Engine, ExecError, Phase};
