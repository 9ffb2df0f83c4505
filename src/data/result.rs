//! Result containers for a tested condition pair.

use crate::correct::Correction;
use crate::test::TestKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Detection status of a feature across the two conditions.
///
/// A side counts as absent when every one of its observed measurements
/// is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    /// Detected in both conditions.
    Both,
    /// Detected only in the first condition of the pair.
    OnlyFirst,
    /// Detected only in the second condition of the pair.
    OnlySecond,
}

impl Presence {
    /// Human-readable presence label, naming the condition the feature
    /// was detected in: `Both`, `Only_A`, `Only_B`.
    pub fn label(&self, label_a: &str, label_b: &str) -> String {
        match self {
            Presence::Both => "Both".to_string(),
            Presence::OnlyFirst => format!("Only_{label_a}"),
            Presence::OnlySecond => format!("Only_{label_b}"),
        }
    }
}

/// Differential abundance result for a single feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResult {
    /// Feature identifier.
    pub feature_id: String,
    /// Annotation carried over from the input tables.
    pub annotation: String,
    /// Detection status across the two conditions.
    pub presence: Presence,
    /// Mean of the observed measurements in the first condition.
    pub mean_a: f64,
    /// Mean of the observed measurements in the second condition.
    pub mean_b: f64,
    /// Sample standard deviation in the first condition.
    pub std_a: f64,
    /// Sample standard deviation in the second condition.
    pub std_b: f64,
    /// log2(mean_a / mean_b), with zero means floored before the ratio.
    pub log2_fold_change: f64,
    /// Raw test statistic (t or U).
    pub statistic: f64,
    /// Two-sided raw p-value.
    pub p_value: f64,
    /// p-value after multiple-testing correction.
    pub corrected_p_value: f64,
    /// Whether the corrected p-value falls below the significance level.
    pub significant: bool,
}

impl PairResult {
    /// -log10 of the corrected p-value.
    #[inline]
    pub fn neg_log10(&self) -> f64 {
        -self.corrected_p_value.log10()
    }
}

/// All per-feature results for one tested condition pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResultSet {
    /// Label of the first condition.
    pub label_a: String,
    /// Label of the second condition.
    pub label_b: String,
    /// Test the pair was run with.
    pub test: TestKind,
    /// Correction the p-values were adjusted with.
    pub correction: Correction,
    /// Significance level the flags were computed at.
    pub alpha: f64,
    /// Per-feature results, in input feature order.
    pub results: Vec<PairResult>,
}

impl PairResultSet {
    pub fn new(
        label_a: impl Into<String>,
        label_b: impl Into<String>,
        test: TestKind,
        correction: Correction,
        alpha: f64,
        results: Vec<PairResult>,
    ) -> Self {
        Self {
            label_a: label_a.into(),
            label_b: label_b.into(),
            test,
            correction,
            alpha,
            results,
        }
    }

    /// Number of tested features.
    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate over the per-feature results.
    pub fn iter(&self) -> impl Iterator<Item = &PairResult> {
        self.results.iter()
    }

    /// Results flagged significant at the set's significance level.
    pub fn significant(&self) -> Vec<&PairResult> {
        self.results.iter().filter(|r| r.significant).collect()
    }

    /// Results sorted by raw p-value, ascending. NaN p-values sort last.
    pub fn sorted_by_pvalue(&self) -> Vec<&PairResult> {
        let mut sorted: Vec<&PairResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            a.p_value
                .partial_cmp(&b.p_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Base name for files derived from this pair:
    /// `{label_a}_vs_{label_b}_{test}_{correction}`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_vs_{}_{}_{}",
            self.label_a,
            self.label_b,
            self.test.name(),
            self.correction.name()
        )
    }

    /// Aggregate counts for logging and run reports.
    pub fn summary(&self) -> PairSummary {
        let n_significant = self.results.iter().filter(|r| r.significant).count();
        let n_exclusive = self
            .results
            .iter()
            .filter(|r| r.presence != Presence::Both)
            .count();
        PairSummary {
            label_a: self.label_a.clone(),
            label_b: self.label_b.clone(),
            n_features: self.results.len(),
            n_significant,
            n_exclusive,
            alpha: self.alpha,
        }
    }

    /// Write the result table as TSV.
    ///
    /// One row per feature, in input order. Tabs inside annotations are
    /// replaced with spaces so the column count stays fixed.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "feature_id\tannotation\tpresence\tmean_a\tmean_b\tstd_a\tstd_b\t\
             log2_fold_change\traw_statistic\traw_p_value\tcorrected_p_value\t\
             neg_log10_corrected_p\tsignificance_flag"
        )?;

        for r in &self.results {
            writeln!(
                writer,
                "{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6e}\t{:.6e}\t{:.4}\t{}",
                r.feature_id,
                r.annotation.replace('\t', " "),
                r.presence.label(&self.label_a, &self.label_b),
                r.mean_a,
                r.mean_b,
                r.std_a,
                r.std_b,
                r.log2_fold_change,
                r.statistic,
                r.p_value,
                r.corrected_p_value,
                r.neg_log10(),
                r.significant,
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Aggregate counts for one tested pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSummary {
    pub label_a: String,
    pub label_b: String,
    pub n_features: usize,
    pub n_significant: usize,
    pub n_exclusive: usize,
    pub alpha: f64,
}

impl fmt::Display for PairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison: {} vs {}", self.label_a, self.label_b)?;
        writeln!(f, "  Features tested:     {}", self.n_features)?;
        writeln!(
            f,
            "  Significant (alpha = {}): {}",
            self.alpha, self.n_significant
        )?;
        writeln!(f, "  Exclusive detections: {}", self.n_exclusive)
    }
}
