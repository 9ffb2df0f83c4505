//! Benjamini-Hochberg and Benjamini-Yekutieli false discovery rate control.

/// Benjamini-Hochberg step-up adjustment.
///
/// Controls the FDR under independence (and positive dependence) of the
/// tests. Output is in input order, monotone over the sorted p-values,
/// and capped at 1.
pub fn fdr_bh(p_values: &[f64]) -> Vec<f64> {
    step_up(p_values, 1.0)
}

/// Benjamini-Yekutieli step-up adjustment.
///
/// Like BH but inflated by the harmonic factor c(m) = sum(1/i), which
/// keeps FDR control under arbitrary dependence.
pub fn fdr_by(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let c_m: f64 = (1..=m).map(|i| 1.0 / i as f64).sum();
    step_up(p_values, c_m)
}

/// Step-up adjustment shared by BH (scale = 1) and BY (scale = c(m)).
fn step_up(p_values: &[f64], scale: f64) -> Vec<f64> {
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

    let mut q_sorted = vec![0.0; n];
    let n_f64 = n as f64;

    // Start from the largest p-value and work backwards, keeping the
    // adjusted values monotone.
    q_sorted[n - 1] = (p_values[indices[n - 1]] * scale).min(1.0);
    for i in (0..n - 1).rev() {
        let rank = (i + 1) as f64;
        let adjusted = p_values[indices[i]] * n_f64 * scale / rank;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    // Restore original order
    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }
    q_values
}
