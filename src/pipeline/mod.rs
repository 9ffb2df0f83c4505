//! Pairwise run orchestration.

mod runner;

pub use runner::{run_pairwise, RunConfig, RunSummary};
