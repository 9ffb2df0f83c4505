//! Multiple-testing corrections applied per condition pair.

mod bh;

pub use bh::{fdr_bh, fdr_by};

use crate::error::{ProtdiffError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Multiple-testing correction method.
///
/// Bonferroni, Holm and Sidak control the family-wise error rate;
/// the FDR methods control the expected share of false discoveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Leave raw p-values untouched.
    #[default]
    None,
    /// Bonferroni: p * m, capped at 1.
    Bonferroni,
    /// Holm step-down.
    Holm,
    /// Sidak: 1 - (1 - p)^m.
    Sidak,
    /// Benjamini-Hochberg step-up FDR.
    FdrBh,
    /// Benjamini-Yekutieli step-up FDR.
    FdrBy,
}

impl Correction {
    pub fn name(&self) -> &'static str {
        match self {
            Correction::None => "none",
            Correction::Bonferroni => "bonferroni",
            Correction::Holm => "holm",
            Correction::Sidak => "sidak",
            Correction::FdrBh => "fdr_bh",
            Correction::FdrBy => "fdr_by",
        }
    }

    /// Adjust a family of p-values. Output is in input order, same
    /// length, every value in [0, 1].
    pub fn apply(&self, p_values: &[f64]) -> Vec<f64> {
        let m = p_values.len() as f64;
        match self {
            Correction::None => p_values.to_vec(),
            Correction::Bonferroni => p_values.iter().map(|p| (p * m).min(1.0)).collect(),
            Correction::Holm => holm(p_values),
            Correction::Sidak => p_values
                .iter()
                .map(|p| (1.0 - (1.0 - p).powf(m)).min(1.0))
                .collect(),
            Correction::FdrBh => fdr_bh(p_values),
            Correction::FdrBy => fdr_by(p_values),
        }
    }
}

impl FromStr for Correction {
    type Err = ProtdiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Correction::None),
            "bonferroni" => Ok(Correction::Bonferroni),
            "holm" => Ok(Correction::Holm),
            "sidak" => Ok(Correction::Sidak),
            "fdr_bh" | "fdr-bh" | "bh" | "benjamini-hochberg" => Ok(Correction::FdrBh),
            "fdr_by" | "fdr-by" | "by" | "benjamini-yekutieli" => Ok(Correction::FdrBy),
            _ => Err(ProtdiffError::UnknownCorrectionMethod(s.to_string())),
        }
    }
}

/// Holm step-down adjustment. FWER control without the independence
/// assumptions Bonferroni shares, and never less powerful than it.
fn holm(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    if n == 0 {
        return vec![];
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Walk the sorted p-values upwards, carrying the running maximum so
    // the adjusted sequence stays monotone.
    let mut q_sorted = vec![0.0; n];
    let mut running_max: f64 = 0.0;
    for (i, &orig_idx) in indices.iter().enumerate() {
        let factor = (n - i) as f64;
        let adjusted = (p_values[orig_idx] * factor).min(1.0);
        running_max = running_max.max(adjusted);
        q_sorted[i] = running_max;
    }

    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }
    q_values
}
