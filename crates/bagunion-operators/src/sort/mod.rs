//! Phase 1: external sort of one relation.

pub mod external;
pub mod run;
pub mod strategy;
