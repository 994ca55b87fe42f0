#![forbid(unsafe_code)]
//! bagunion-core: the shared vocabulary of the engine.
//!
//! - `record`: the fixed-width record codec and its total order.
//! - `budget`: memory-limit to record-budget/fan-in derivation.
//! - `config`: serializable engine configuration.
//! - `error`: the error taxonomy every layer propagates.
//! - `report`: merge metrics and run reports handed back to callers.
//!
//! No file I/O happens in this crate.

pub mod budget;
pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod record;
pub mod report;

/// Engine version string stamped into run reports.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};
pub use record::Record;
