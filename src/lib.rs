//! Pairwise Differential Abundance Testing for Proteomics Tables
//!
//! This library compares annotated protein abundance tables (one file
//! per biological condition, one row of replicate measurements per
//! protein) in all pairwise combinations, testing each shared protein
//! for a difference in abundance and adjusting the resulting p-values
//! for multiple testing.
//!
//! # Overview
//!
//! The library is organized into small modules along the run:
//!
//! - **data**: Core data structures (AbundanceTable, PairResultSet)
//! - **discover**: Table discovery and condition-pair enumeration
//! - **annotate**: Annotation of formatted tables from a lookup file
//! - **test**: Two-sample tests (Student, Welch, Mann-Whitney)
//! - **compare**: Per-pair feature screening and testing
//! - **correct**: Multiple-testing corrections (Bonferroni ... BY)
//! - **report**: Volcano-point and significant-feature reports
//! - **pipeline**: Directory-level run orchestration
//!
//! # Example
//!
//! ```no_run
//! use protdiff::prelude::*;
//!
//! // Compare every pair of *_annotated.txt tables in a directory.
//! let config = RunConfig {
//!     test: TestKind::Welch,
//!     correction: Correction::FdrBh,
//!     ..RunConfig::default()
//! };
//! let summary = run_pairwise("data/", "results/", &config).unwrap();
//! println!("{summary}");
//!
//! // Or compare two tables directly.
//! let a = AbundanceTable::from_tsv("data/A_annotated.txt").unwrap();
//! let b = AbundanceTable::from_tsv("data/B_annotated.txt").unwrap();
//! let comparison = compare_tables(&a, &b, TestKind::Student).unwrap();
//! let corrected = Correction::FdrBh.apply(&comparison.p_values());
//! ```

pub mod annotate;
pub mod compare;
pub mod correct;
pub mod data;
pub mod discover;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::annotate::{annotate_directory, annotate_file, AnnotationMap};
    pub use crate::compare::{compare_tables, Comparison, ComparisonRow, ZERO_FILL};
    pub use crate::correct::{fdr_bh, fdr_by, Correction};
    pub use crate::data::{
        condition_label, AbundanceTable, PairResult, PairResultSet, PairSummary, Presence,
    };
    pub use crate::discover::{
        annotated_tables, enumerate_pairs, pair_indices, PairOrder, ANNOTATED_SUFFIX,
    };
    pub use crate::error::{ProtdiffError, Result};
    pub use crate::pipeline::{run_pairwise, RunConfig, RunSummary};
    pub use crate::report::{
        significant_entries, write_significant_lists, write_volcano_points, ResultTable,
        SignificantCategory, VolcanoClass,
    };
    pub use crate::test::{
        mann_whitney_u, run_test, student_t, welch_t, TestKind, TestOutcome,
    };
}
