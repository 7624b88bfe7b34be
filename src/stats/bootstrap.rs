//! Percentile bootstrap confidence interval for the mean.

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::SimError;
use crate::stats::quantile_sorted;

/// A percentile bootstrap confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapCi {
    /// Lower percentile bound.
    pub lo: f64,
    /// Upper percentile bound.
    pub hi: f64,
    /// Number of bootstrap resamples used.
    pub n_boot: usize,
    /// Two-sided miscoverage level (0.05 for a 95% interval).
    pub alpha: f64,
}

/// Percentile bootstrap CI for the mean of `values`.
///
/// Resamples `values` with replacement `n_boot` times and takes the
/// `alpha/2` and `1 - alpha/2` quantiles of the resample means. The caller
/// supplies a dedicated generator so bootstrap draws never share a stream
/// with replicate simulations.
///
/// # Errors
///
/// Returns [`SimError::InsufficientData`] if `values` is empty. The
/// reliability policy for small n (fewer than
/// [`crate::config::MIN_RELIABLE_SEEDS`] seeds) is enforced by the caller,
/// which omits the CI entirely rather than reporting a meaningless one.
pub fn bootstrap_ci_mean(
    values: &[f64],
    n_boot: usize,
    alpha: f64,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<BootstrapCi, SimError> {
    assert!(n_boot > 0, "n_boot must be positive");
    assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");

    let n = values.len();
    if n == 0 {
        return Err(SimError::InsufficientData {
            needed: 1,
            got: 0,
            context: "bootstrap CI",
        });
    }

    let mut means = Vec::with_capacity(n_boot);
    for _ in 0..n_boot {
        let mut acc = 0.0;
        for _ in 0..n {
            acc += values[rng.random_range(0..n)];
        }
        means.push(acc / n as f64);
    }
    means.sort_by(|a, b| a.total_cmp(b));

    Ok(BootstrapCi {
        lo: quantile_sorted(&means, alpha / 2.0),
        hi: quantile_sorted(&means, 1.0 - alpha / 2.0),
        n_boot,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeedSequence;
    use crate::stats::mean;
    use rand_distr::{Distribution, StandardNormal};

    #[test]
    fn ci_brackets_sample_mean() {
        let values: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        let m = mean(&values);
        let mut rng = SeedSequence::new(777).stream(0);
        let ci = bootstrap_ci_mean(&values, 2_000, 0.05, &mut rng).unwrap();
        assert!(ci.lo <= m && m <= ci.hi, "CI [{}, {}] misses mean {m}", ci.lo, ci.hi);
        assert!(ci.lo < ci.hi);
    }

    #[test]
    fn degenerate_sample_gives_point_interval() {
        let values = vec![2.0; 10];
        let mut rng = SeedSequence::new(1).stream(0);
        let ci = bootstrap_ci_mean(&values, 500, 0.05, &mut rng).unwrap();
        assert_eq!(ci.lo, 2.0);
        assert_eq!(ci.hi, 2.0);
    }

    #[test]
    fn empty_sample_rejected() {
        let mut rng = SeedSequence::new(1).stream(0);
        let err = bootstrap_ci_mean(&[], 100, 0.05, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InsufficientData { .. }));
    }

    #[test]
    fn deterministic_under_fixed_stream() {
        let values: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let ci_a =
            bootstrap_ci_mean(&values, 1_000, 0.05, &mut SeedSequence::new(9).stream(0)).unwrap();
        let ci_b =
            bootstrap_ci_mean(&values, 1_000, 0.05, &mut SeedSequence::new(9).stream(0)).unwrap();
        assert_eq!(ci_a, ci_b);
    }

    /// Coverage calibration: over many synthetic datasets with known mean 0,
    /// the nominal 95% interval should contain 0 at roughly its nominal
    /// rate. Statistical test with wide margins, not a point assertion.
    #[test]
    fn nominal_coverage_rate() {
        let ss = SeedSequence::new(20_240_517);
        let n_datasets = 300;
        let n_per = 20;
        let mut covered = 0;

        for d in 0..n_datasets {
            let mut data_rng = ss.stream(d);
            let values: Vec<f64> = (0..n_per)
                .map(|_| StandardNormal.sample(&mut data_rng))
                .collect();

            let mut boot_rng = ss.offset(777).stream(d);
            let ci = bootstrap_ci_mean(&values, 500, 0.05, &mut boot_rng).unwrap();
            if ci.lo <= 0.0 && 0.0 <= ci.hi {
                covered += 1;
            }
        }

        let rate = covered as f64 / n_datasets as f64;
        // The percentile bootstrap undercovers slightly at n=20; accept a
        // broad window around the nominal 0.95.
        assert!(
            (0.85..=1.0).contains(&rate),
            "coverage {rate} outside [0.85, 1.0]"
        );
    }
}
