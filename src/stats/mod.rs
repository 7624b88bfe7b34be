//! Statistical primitives for scaling-law estimation.
//!
//! - Median / percentile via O(n) selection
//! - Log-log ordinary least squares ([`regression`])
//! - Percentile bootstrap CI of the mean ([`bootstrap`])

pub mod bootstrap;
pub mod regression;

/// Arithmetic mean. Returns `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with n−1 denominator.
///
/// Returns 0.0 when fewer than two values are present, matching the
/// convention that a single replicate has no spread to report.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Median of a slice, using `select_nth_unstable` for O(n) expected time.
///
/// The slice is partially reordered as a side effect. The median is the
/// robust per-flux reducer throughout the pipeline: fixed-point trials are
/// heavy-tailed and a mean would be dominated by rare large excursions.
///
/// # Panics
///
/// Panics if `values` is empty.
pub fn median(values: &mut [f64]) -> f64 {
    assert!(!values.is_empty(), "cannot take median of empty slice");

    let n = values.len();
    let mid = n / 2;

    let (_, &mut hi, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    if n % 2 == 1 {
        return hi;
    }

    // Even length: the lower middle sits in the left partition.
    let (_, &mut lo, _) = values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
    (lo + hi) / 2.0
}

/// The `p`-quantile of an already sorted slice, by nearest-rank index.
///
/// # Panics
///
/// Panics if `sorted` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "cannot take quantile of empty slice");
    assert!((0.0..=1.0).contains(&p), "quantile probability must be in [0, 1]");

    let idx = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
