//! Whole-file readers that sit outside the sort/merge path.

pub mod count;
