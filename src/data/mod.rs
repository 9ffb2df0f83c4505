//! Core data structures: abundance tables and pairwise result sets.

mod result;
mod table;

pub use result::{PairResult, PairResultSet, PairSummary, Presence};
pub use table::{condition_label, AbundanceTable};
