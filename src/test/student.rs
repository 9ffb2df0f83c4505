//! Student's and Welch's two-sample t-tests.

use super::{mean_and_var, TestOutcome};
use crate::error::{ProtdiffError, Result};
use statrs::distribution::{ContinuousCDF, StudentsT};

fn check_sizes(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() < 2 || b.len() < 2 {
        return Err(ProtdiffError::InvalidParameter(format!(
            "t-test needs at least two observations per group (got {} and {})",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Two-sided p-value for a t statistic with the given degrees of freedom.
fn two_sided_p(t: f64, df: f64) -> f64 {
    // df > 0 is guaranteed by the callers, so the constructor cannot fail.
    let dist = StudentsT::new(0.0, 1.0, df).unwrap();
    2.0 * (1.0 - dist.cdf(t.abs()))
}

/// Both groups constant: zero difference is a non-result (p = 1),
/// any difference over a zero standard error is maximally significant.
fn degenerate_outcome(diff: f64) -> TestOutcome {
    if diff == 0.0 {
        TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        }
    } else {
        TestOutcome {
            statistic: f64::INFINITY.copysign(diff),
            p_value: 0.0,
        }
    }
}

/// Student's t-test with pooled variance.
///
/// Assumes equal variances; degrees of freedom are n1 + n2 - 2.
pub fn student_t(a: &[f64], b: &[f64]) -> Result<TestOutcome> {
    check_sizes(a, b)?;
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (mean1, var1) = mean_and_var(a);
    let (mean2, var2) = mean_and_var(b);
    let diff = mean1 - mean2;

    let df = n1 + n2 - 2.0;
    let pooled_var = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return Ok(degenerate_outcome(diff));
    }

    let t = diff / se;
    Ok(TestOutcome {
        statistic: t,
        p_value: two_sided_p(t, df),
    })
}

/// Welch's t-test with Satterthwaite degrees of freedom.
///
/// Does not assume equal variances; preferred when replicate spread
/// differs between the two conditions.
pub fn welch_t(a: &[f64], b: &[f64]) -> Result<TestOutcome> {
    check_sizes(a, b)?;
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (mean1, var1) = mean_and_var(a);
    let (mean2, var2) = mean_and_var(b);
    let diff = mean1 - mean2;

    let term1 = var1 / n1;
    let term2 = var2 / n2;
    let se = (term1 + term2).sqrt();
    if se == 0.0 {
        return Ok(degenerate_outcome(diff));
    }

    let df = (term1 + term2).powi(2)
        / (term1.powi(2) / (n1 - 1.0) + term2.powi(2) / (n2 - 1.0));
    let t = diff / se;
    Ok(TestOutcome {
        statistic: t,
        p_value: two_sided_p(t, df),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_student_shifted_groups() {
        let outcome = student_t(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(outcome.statistic, -1.224744871391589, epsilon = 1e-10);
        assert_relative_eq!(outcome.p_value, 0.2878641347266906, epsilon = 1e-8);
    }

    #[test]
    fn test_student_half_shift() {
        let outcome = student_t(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]).unwrap();
        assert_relative_eq!(outcome.statistic, -0.6123724356957945, epsilon = 1e-10);
        assert_relative_eq!(outcome.p_value, 0.5733922538253553, epsilon = 1e-8);
    }

    #[test]
    fn test_student_two_per_group() {
        let outcome = student_t(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_relative_eq!(outcome.statistic, -2.82842712474619, epsilon = 1e-10);
        assert_relative_eq!(outcome.p_value, 0.10557280900008408, epsilon = 1e-8);
    }

    #[test]
    fn test_welch_matches_student_for_balanced_groups() {
        // Equal sizes and equal variances: the two tests coincide.
        let student = student_t(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
        let welch = welch_t(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(welch.statistic, student.statistic, epsilon = 1e-12);
        assert_relative_eq!(welch.p_value, student.p_value, epsilon = 1e-12);
    }

    #[test]
    fn test_welch_unequal_groups() {
        let outcome = welch_t(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0]).unwrap();
        assert_relative_eq!(outcome.statistic, -3.0123203803835468, epsilon = 1e-10);
        assert_relative_eq!(outcome.p_value, 0.09198930883630205, epsilon = 1e-8);
    }

    #[test]
    fn test_identical_constant_groups() {
        let outcome = student_t(&[2.0, 2.0, 2.0], &[2.0, 2.0, 2.0]).unwrap();
        assert_eq!(outcome.statistic, 0.0);
        assert_eq!(outcome.p_value, 1.0);
    }

    #[test]
    fn test_constant_groups_with_difference() {
        let outcome = student_t(&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0]).unwrap();
        assert!(outcome.statistic.is_infinite());
        assert!(outcome.statistic < 0.0);
        assert_eq!(outcome.p_value, 0.0);

        let welch = welch_t(&[3.0, 3.0], &[1.0, 1.0]).unwrap();
        assert!(welch.statistic.is_infinite());
        assert!(welch.statistic > 0.0);
        assert_eq!(welch.p_value, 0.0);
    }

    #[test]
    fn test_too_few_observations() {
        assert!(student_t(&[1.0], &[2.0, 3.0]).is_err());
        assert!(welch_t(&[1.0, 2.0], &[]).is_err());
    }

    #[test]
    fn test_symmetry() {
        let ab = student_t(&[1.0, 2.0, 3.0], &[4.0, 5.0, 7.0]).unwrap();
        let ba = student_t(&[4.0, 5.0, 7.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(ab.statistic, -ba.statistic, epsilon = 1e-12);
        assert_relative_eq!(ab.p_value, ba.p_value, epsilon = 1e-12);
    }
}
