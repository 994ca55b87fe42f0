#![forbid(unsafe_code)]
//! bagunion-mem: I/O cost accounting and scratch-file bookkeeping.
//!
//! Nothing here reads or writes record contents. `tracking` counts what the
//! I/O layer reports, `spill` names/deletes/adopts run files, and `guard`
//! removes half-written files when a writer is dropped without committing.

pub mod guard;
pub mod spill;
pub mod tracking;

pub use guard::ScratchGuard;
pub use spill::{RunMeta, RunName, RunStore};
pub use tracking::IoCostTracker;
