//! Pairwise comparison of two abundance tables.
//!
//! Intersects the feature ids of two tables, screens each shared
//! feature for usable replicates, and runs the selected two-sample test
//! on the remaining ones. Features detected in only one condition are
//! tested against a near-zero floor so they surface with extreme fold
//! changes instead of disappearing.

use crate::correct::Correction;
use crate::data::{AbundanceTable, PairResult, PairResultSet, Presence};
use crate::error::Result;
use crate::test::{mean_and_var, run_test, TestKind};
use log::debug;
use rayon::prelude::*;

/// Floor substituted for an all-zero side before testing and for a zero
/// mean before the fold-change ratio.
pub const ZERO_FILL: f64 = 1e-14;

/// Tested feature prior to multiple-testing correction.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub feature_id: String,
    pub annotation: String,
    pub presence: Presence,
    pub mean_a: f64,
    pub mean_b: f64,
    pub std_a: f64,
    pub std_b: f64,
    pub log2_fold_change: f64,
    pub statistic: f64,
    pub p_value: f64,
}

/// Outcome of comparing one table pair, before correction.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub label_a: String,
    pub label_b: String,
    /// Tested rows, ordered by feature id.
    pub rows: Vec<ComparisonRow>,
    /// Features present in both tables.
    pub n_shared: usize,
    /// Shared features dropped for having fewer than two finite
    /// observations on a side.
    pub n_skipped_insufficient: usize,
    /// Shared features dropped for being all-zero on both sides.
    pub n_skipped_all_zero: usize,
}

impl Comparison {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw p-values in row order, ready for correction.
    pub fn p_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.p_value).collect()
    }

    /// Attach corrected p-values and significance flags, producing the
    /// final result set for this pair.
    ///
    /// `corrected` must come from applying a correction to
    /// [`Comparison::p_values`], so it has one entry per row.
    pub fn into_result_set(
        self,
        corrected: &[f64],
        test: TestKind,
        correction: Correction,
        alpha: f64,
    ) -> PairResultSet {
        assert_eq!(corrected.len(), self.rows.len());
        let results = self
            .rows
            .into_iter()
            .zip(corrected.iter().copied())
            .map(|(row, q)| PairResult {
                feature_id: row.feature_id,
                annotation: row.annotation,
                presence: row.presence,
                mean_a: row.mean_a,
                mean_b: row.mean_b,
                std_a: row.std_a,
                std_b: row.std_b,
                log2_fold_change: row.log2_fold_change,
                statistic: row.statistic,
                p_value: row.p_value,
                corrected_p_value: q,
                significant: q < alpha,
            })
            .collect();
        PairResultSet::new(self.label_a, self.label_b, test, correction, alpha, results)
    }
}

enum RowOutcome {
    Tested(Box<ComparisonRow>),
    Insufficient,
    AllZero,
}

/// Compare two abundance tables feature by feature.
///
/// Only features present in both tables are considered; they are
/// processed in sorted id order. Per feature:
/// - non-finite measurements are dropped; a side left with fewer than
///   two observations disqualifies the feature,
/// - features all-zero on both sides are dropped,
/// - a side that is all-zero is replaced by the [`ZERO_FILL`] floor for
///   the test and recorded as an exclusive detection,
/// - means and standard deviations are reported over the observed
///   (unfloored) measurements.
pub fn compare_tables(
    a: &AbundanceTable,
    b: &AbundanceTable,
    test: TestKind,
) -> Result<Comparison> {
    let mut shared: Vec<&str> = a
        .feature_ids()
        .iter()
        .filter(|id| b.contains(id.as_str()))
        .map(|id| id.as_str())
        .collect();
    shared.sort_unstable();
    let n_shared = shared.len();

    let outcomes: Vec<RowOutcome> = shared
        .par_iter()
        .map(|&id| compare_feature(a, b, id, test))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(outcomes.len());
    let mut n_skipped_insufficient = 0;
    let mut n_skipped_all_zero = 0;
    for outcome in outcomes {
        match outcome {
            RowOutcome::Tested(row) => rows.push(*row),
            RowOutcome::Insufficient => n_skipped_insufficient += 1,
            RowOutcome::AllZero => n_skipped_all_zero += 1,
        }
    }

    Ok(Comparison {
        label_a: a.label().to_string(),
        label_b: b.label().to_string(),
        rows,
        n_shared,
        n_skipped_insufficient,
        n_skipped_all_zero,
    })
}

fn compare_feature(
    a: &AbundanceTable,
    b: &AbundanceTable,
    id: &str,
    test: TestKind,
) -> Result<RowOutcome> {
    // Both sides contain the id, so the lookups cannot miss.
    let obs_a: Vec<f64> = a
        .get(id)
        .into_iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let obs_b: Vec<f64> = b
        .get(id)
        .into_iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    if obs_a.len() < 2 || obs_b.len() < 2 {
        debug!(
            "skipping {id}: {} and {} finite observations",
            obs_a.len(),
            obs_b.len()
        );
        return Ok(RowOutcome::Insufficient);
    }

    let all_zero_a = obs_a.iter().all(|&v| v == 0.0);
    let all_zero_b = obs_b.iter().all(|&v| v == 0.0);
    if all_zero_a && all_zero_b {
        debug!("skipping {id}: all measurements zero in both conditions");
        return Ok(RowOutcome::AllZero);
    }

    let presence = if all_zero_a {
        Presence::OnlySecond
    } else if all_zero_b {
        Presence::OnlyFirst
    } else {
        Presence::Both
    };

    let test_a: Vec<f64> = if all_zero_a {
        vec![ZERO_FILL; obs_a.len()]
    } else {
        obs_a.clone()
    };
    let test_b: Vec<f64> = if all_zero_b {
        vec![ZERO_FILL; obs_b.len()]
    } else {
        obs_b.clone()
    };
    let outcome = run_test(test, &test_a, &test_b)?;

    let (mean_a, var_a) = mean_and_var(&obs_a);
    let (mean_b, var_b) = mean_and_var(&obs_b);
    let ratio_a = if mean_a == 0.0 { ZERO_FILL } else { mean_a };
    let ratio_b = if mean_b == 0.0 { ZERO_FILL } else { mean_b };
    let log2_fold_change = (ratio_a / ratio_b).log2();

    let annotation_a = a.row_index(id).map(|i| a.annotation(i)).unwrap_or("");
    let annotation_b = b.row_index(id).map(|i| b.annotation(i)).unwrap_or("");
    let annotation = if !annotation_a.is_empty() {
        annotation_a.to_string()
    } else if !annotation_b.is_empty() {
        annotation_b.to_string()
    } else {
        "Unknown".to_string()
    };

    Ok(RowOutcome::Tested(Box::new(ComparisonRow {
        feature_id: id.to_string(),
        annotation,
        presence,
        mean_a,
        mean_b,
        std_a: var_a.sqrt(),
        std_b: var_b.sqrt(),
        log2_fold_change,
        statistic: outcome.statistic,
        p_value: outcome.p_value,
    })))
}
