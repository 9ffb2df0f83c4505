//! Two-sample statistical tests for differential abundance.

mod student;

pub use mannwhitney::mann_whitney_u;
pub use student::{student_t, welch_t};

use crate::error::{ProtdiffError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Two-sample test applied to each shared feature of a condition pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TestKind {
    /// Student's t-test with pooled variance.
    #[default]
    #[serde(rename = "t-test")]
    Student,
    /// Welch's t-test with Satterthwaite degrees of freedom.
    #[serde(rename = "welch")]
    Welch,
    /// Mann-Whitney U rank-sum test with normal approximation.
    #[serde(rename = "mann-whitney")]
    MannWhitney,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::Student => "t-test",
            TestKind::Welch => "welch",
            TestKind::MannWhitney => "mann-whitney",
        }
    }
}

impl FromStr for TestKind {
    type Err = ProtdiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "t-test" | "ttest" | "student" => Ok(TestKind::Student),
            "welch" => Ok(TestKind::Welch),
            "mann-whitney" | "mannwhitney" | "mannwhitneyu" => Ok(TestKind::MannWhitney),
            _ => Err(ProtdiffError::UnknownTest(s.to_string())),
        }
    }
}

/// Statistic and two-sided p-value from a single two-sample test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test statistic: t for the t-tests, U for Mann-Whitney.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Run the selected test on two measurement vectors.
///
/// Both vectors must hold at least two values.
pub fn run_test(kind: TestKind, a: &[f64], b: &[f64]) -> Result<TestOutcome> {
    match kind {
        TestKind::Student => student_t(a, b),
        TestKind::Welch => welch_t(a, b),
        TestKind::MannWhitney => mann_whitney_u(a, b),
    }
}

/// Mean and unbiased sample variance (ddof = 1) of a slice.
pub(crate) fn mean_and_var(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() < 2 {
        0.0
    } else {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    };
    (mean, var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("t-test".parse::<TestKind>().unwrap(), TestKind::Student);
        assert_eq!("Student".parse::<TestKind>().unwrap(), TestKind::Student);
        assert_eq!("welch".parse::<TestKind>().unwrap(), TestKind::Welch);
        assert_eq!(
            "mann-whitney".parse::<TestKind>().unwrap(),
            TestKind::MannWhitney
        );
        assert_eq!(
            "MannWhitneyU".parse::<TestKind>().unwrap(),
            TestKind::MannWhitney
        );
        assert!("anova".parse::<TestKind>().is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [TestKind::Student, TestKind::Welch, TestKind::MannWhitney] {
            assert_eq!(kind.name().parse::<TestKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_run_test_dispatch() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 3.0, 4.0];
        let student = run_test(TestKind::Student, &a, &b).unwrap();
        let direct = student_t(&a, &b).unwrap();
        assert_relative_eq!(student.statistic, direct.statistic);
        assert_relative_eq!(student.p_value, direct.p_value);
    }

    #[test]
    fn test_mean_and_var() {
        let (mean, var) = mean_and_var(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(mean, 2.0);
        assert_relative_eq!(var, 1.0);

        let (mean, var) = mean_and_var(&[5.0]);
        assert_relative_eq!(mean, 5.0);
        assert_relative_eq!(var, 0.0);
    }
}
