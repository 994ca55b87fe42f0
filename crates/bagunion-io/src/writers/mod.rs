//! Output writers.

pub mod union;
