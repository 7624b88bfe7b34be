//! Shared defaults for simulations and persistence.
//!
//! Parameters that are shared between simulations live here; per-simulation
//! parameters live with their estimator (`FixedPointParams` etc.) and
//! reference these defaults.

/// Process-wide default base seed. Every per-seed child stream is derived
/// deterministically from this value unless overridden per invocation.
pub const DEFAULT_SEED: u64 = 123_456;

/// Default number of Monte Carlo trials per flux point.
pub const DEFAULT_N_MC: usize = 2_000;

/// Default number of bootstrap resamples for the CI of the mean slope.
pub const DEFAULT_N_BOOT: usize = 2_000;

/// Offset added to the base seed to derive the dedicated bootstrap stream,
/// so bootstrap draws never share state with replicate runs.
pub const BOOTSTRAP_SEED_OFFSET: u64 = 777;

/// Default results directory. Persistence creates it on demand; nothing in
/// the core assumes any other storage location.
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Fewer valid seeds than this makes a bootstrap CI untrustworthy; the
/// aggregate is flagged unreliable and its CI omitted.
pub const MIN_RELIABLE_SEEDS: usize = 5;

/// Logarithmically spaced grid of `n` points from `lo` to `hi` inclusive.
///
/// The standard flux grids are `log_grid(1e1, 1e4, 8)` for the constructed
/// classes and `log_grid(5e4, 5e7, 12)` for the inference class.
///
/// # Panics
///
/// Panics if `lo` or `hi` is not strictly positive, or `n < 2`.
pub fn log_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    assert!(lo > 0.0 && hi > 0.0, "log grid endpoints must be positive");
    assert!(n >= 2, "log grid needs at least 2 points");

    let (la, lb) = (lo.log10(), hi.log10());
    let step = (lb - la) / (n - 1) as f64;
    (0..n).map(|i| 10f64.powf(la + step * i as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_grid_endpoints_exact_count() {
        let grid = log_grid(10.0, 1e4, 8);
        assert_eq!(grid.len(), 8);
        assert!((grid[0] - 10.0).abs() < 1e-9);
        assert!((grid[7] - 1e4).abs() < 1e-6);
    }

    #[test]
    fn log_grid_strictly_increasing() {
        let grid = log_grid(5e4, 5e7, 12);
        for w in grid.windows(2) {
            assert!(w[1] > w[0], "grid must be strictly increasing");
        }
    }

    #[test]
    #[should_panic(expected = "endpoints must be positive")]
    fn log_grid_rejects_zero_lo() {
        log_grid(0.0, 1.0, 4);
    }

    #[test]
    #[should_panic(expected = "at least 2 points")]
    fn log_grid_rejects_single_point() {
        log_grid(1.0, 10.0, 1);
    }
}
