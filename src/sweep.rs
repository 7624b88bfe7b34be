//! Multi-seed replication, aggregation, and robustness sweeps.
//!
//! Runs one estimator across N independent seeds (child streams of one
//! [`SeedSequence`]), fits one log-log slope per seed, and reports per-seed
//! slopes, sample mean, sample standard deviation, and a percentile
//! bootstrap CI of the mean. The bootstrap draws from its own dedicated
//! stream so resamples never share state with replicate runs, and results
//! are ordered by seed index deterministically.

use log::{debug, info};

use crate::config::{
    BOOTSTRAP_SEED_OFFSET, DEFAULT_N_BOOT, DEFAULT_SEED, MIN_RELIABLE_SEEDS,
};
use crate::error::SimError;
use crate::rng::SeedSequence;
use crate::sim::imposed::ImposedParams;
use crate::sim::{run_curve, EpistemicClass, ObservableCurve, ResolutionEstimator};
use crate::stats::bootstrap::{bootstrap_ci_mean, BootstrapCi};
use crate::stats::regression::{loglog_fit, LogLogFit};
use crate::stats::{mean, sample_std};

/// Configuration of a multi-seed sweep. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Number of independent seeds.
    pub n_seeds: usize,
    /// Base seed from which all child streams derive.
    pub base_seed: u64,
    /// Bootstrap resamples for the CI of the mean slope.
    pub n_boot: usize,
    /// Two-sided miscoverage level for the CI.
    pub alpha: f64,
    /// Minimum valid points per seed for that seed's fit to count.
    pub min_fit_points: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            n_seeds: 20,
            base_seed: DEFAULT_SEED,
            n_boot: DEFAULT_N_BOOT,
            alpha: 0.05,
            min_fit_points: 2,
        }
    }
}

impl SweepConfig {
    /// Default sweep: 20 seeds, 2000 bootstrap resamples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal sweep for smoke tests and doc examples: 5 seeds, 500
    /// bootstrap resamples.
    pub fn quick() -> Self {
        Self {
            n_seeds: 5,
            n_boot: 500,
            ..Self::default()
        }
    }

    /// Set the number of seeds.
    pub fn n_seeds(mut self, n: usize) -> Self {
        assert!(n > 0, "n_seeds must be positive");
        self.n_seeds = n;
        self
    }

    /// Set the base seed.
    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Set the bootstrap resample count.
    pub fn n_boot(mut self, n: usize) -> Self {
        assert!(n > 0, "n_boot must be positive");
        self.n_boot = n;
        self
    }

    /// Set the per-seed minimum of valid fit points.
    pub fn min_fit_points(mut self, n: usize) -> Self {
        assert!(n >= 2, "a fit needs at least 2 points");
        self.min_fit_points = n;
        self
    }
}

/// One seed's replicate: its curve and fitted slope (if the fit had enough
/// valid points). Created once per replicate, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateFit {
    /// Index of the child stream that produced this replicate.
    pub seed_index: u64,
    /// The seed's observable curve, failed points included.
    pub curve: ObservableCurve,
    /// Fit result; `None` when too few valid points remained.
    pub fit: Option<LogLogFit>,
}

/// Aggregate over per-seed slopes. Derived, read-only; recomputed fresh
/// each run.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeAggregate {
    /// Per-seed slopes, ordered by seed index; `None` marks an unavailable
    /// fit.
    pub slopes: Vec<Option<f64>>,
    /// Mean of the valid slopes; `None` when no seed produced a fit.
    pub mean: Option<f64>,
    /// Sample standard deviation (n−1) of the valid slopes; zero when only
    /// one is valid.
    pub std: Option<f64>,
    /// Percentile bootstrap CI of the mean. Omitted when the aggregate is
    /// unreliable: a CI from fewer than
    /// [`MIN_RELIABLE_SEEDS`] seeds would be noise dressed up as precision.
    pub ci95: Option<BootstrapCi>,
    /// Number of seeds with a valid fit.
    pub n_valid: usize,
    /// Whether `n_valid` meets [`MIN_RELIABLE_SEEDS`].
    pub reliable: bool,
}

/// Full result of a multi-seed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Epistemic class of the estimator that produced this sweep.
    pub class: EpistemicClass,
    /// Model description from the estimator.
    pub model: String,
    /// Theoretical slope for comparison, when one exists.
    pub expected_slope: Option<f64>,
    /// Flux grid shared by all replicates.
    pub grid: Vec<f64>,
    /// Per-seed replicates, ordered by seed index.
    pub replicates: Vec<ReplicateFit>,
    /// Slope aggregate across seeds.
    pub aggregate: SlopeAggregate,
    /// Base seed the sweep derived its streams from.
    pub base_seed: u64,
}

/// Aggregate a set of per-seed slopes: mean, sample std, bootstrap CI.
///
/// The CI is drawn from a stream derived from `base_seed` offset by
/// [`BOOTSTRAP_SEED_OFFSET`].
pub fn aggregate_slopes(
    slopes: &[Option<f64>],
    base_seed: u64,
    n_boot: usize,
    alpha: f64,
) -> Result<SlopeAggregate, SimError> {
    let valid: Vec<f64> = slopes.iter().flatten().copied().collect();
    let n_valid = valid.len();
    let reliable = n_valid >= MIN_RELIABLE_SEEDS;

    let (mean_slope, std_slope) = if n_valid > 0 {
        (Some(mean(&valid)), Some(sample_std(&valid)))
    } else {
        (None, None)
    };

    let ci95 = if reliable {
        let mut ci_rng = SeedSequence::new(base_seed)
            .offset(BOOTSTRAP_SEED_OFFSET)
            .stream(0);
        Some(bootstrap_ci_mean(&valid, n_boot, alpha, &mut ci_rng)?)
    } else {
        None
    };

    Ok(SlopeAggregate {
        slopes: slopes.to_vec(),
        mean: mean_slope,
        std: std_slope,
        ci95,
        n_valid,
        reliable,
    })
}

/// Run `estimator` across `grid` for each of `config.n_seeds` seeds and
/// aggregate the fitted slopes.
///
/// # Errors
///
/// Propagates hard estimator failures ([`SimError::InvalidRate`]); per-seed
/// fit failures are recorded as `None` slopes, not errors.
pub fn multi_seed_sweep<E: ResolutionEstimator + ?Sized>(
    estimator: &E,
    grid: &[f64],
    config: &SweepConfig,
) -> Result<SweepResult, SimError> {
    let seeds = SeedSequence::new(config.base_seed);
    info!(
        "sweep: class={} seeds={} grid={} points",
        estimator.epistemic_class(),
        config.n_seeds,
        grid.len()
    );

    let mut replicates = Vec::with_capacity(config.n_seeds);
    let mut slopes = Vec::with_capacity(config.n_seeds);

    for index in 0..config.n_seeds as u64 {
        let mut rng = seeds.stream(index);
        let curve = run_curve(estimator, grid, &mut rng)?;

        let fit = match loglog_fit(curve.phi(), curve.delta(), config.min_fit_points) {
            Ok(fit) => Some(fit),
            Err(SimError::InsufficientData { got, needed, .. }) => {
                debug!("seed {index}: fit unavailable ({got} valid points, need {needed})");
                None
            }
            Err(err) => return Err(err),
        };

        slopes.push(fit.map(|f| f.slope));
        replicates.push(ReplicateFit {
            seed_index: index,
            curve,
            fit,
        });
    }

    let aggregate = aggregate_slopes(&slopes, config.base_seed, config.n_boot, config.alpha)?;
    if let Some(m) = aggregate.mean {
        info!(
            "sweep done: slope mean {m:.4} over {}/{} valid seeds",
            aggregate.n_valid, config.n_seeds
        );
    }

    Ok(SweepResult {
        class: estimator.epistemic_class(),
        model: estimator.model(),
        expected_slope: estimator.expected_slope(),
        grid: grid.to_vec(),
        replicates,
        aggregate,
        base_seed: config.base_seed,
    })
}

/// One α of an imposed-exponent robustness sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaSweepRow {
    /// Anomalous exponent α.
    pub alpha: f64,
    /// Imposed slope −1/(2+α) the fitter should recover.
    pub expected: f64,
    /// Aggregate over replicate seeds at this α.
    pub aggregate: SlopeAggregate,
}

/// Validate slope recovery across a range of imposed exponents.
///
/// Each α gets its own deterministic sub-family of streams (base seed
/// offset by `10_000 · i`), matching the replication discipline of the
/// single-α sweep.
pub fn alpha_sweep(
    alphas: &[f64],
    grid: &[f64],
    n_mc: usize,
    n_rep: usize,
    base_seed: u64,
    n_boot: usize,
) -> Result<Vec<AlphaSweepRow>, SimError> {
    let mut rows = Vec::with_capacity(alphas.len());
    for (i, &alpha) in alphas.iter().enumerate() {
        let params = ImposedParams::new(alpha).n_mc(n_mc);
        let config = SweepConfig::new()
            .n_seeds(n_rep)
            .base_seed(base_seed.wrapping_add(10_000 * i as u64))
            .n_boot(n_boot);

        let sweep = multi_seed_sweep(&params, grid, &config)?;
        rows.push(AlphaSweepRow {
            alpha,
            expected: -params.imposed_power(),
            aggregate: sweep.aggregate,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::log_grid;

    #[test]
    fn sweep_is_deterministic() {
        let params = ImposedParams::new(0.6).n_mc(100);
        let grid = log_grid(1e1, 1e4, 6);
        let config = SweepConfig::quick().n_seeds(3);

        let a = multi_seed_sweep(&params, &grid, &config).unwrap();
        let b = multi_seed_sweep(&params, &grid, &config).unwrap();
        assert_eq!(a, b, "identical config and seed must reproduce the sweep");
    }

    #[test]
    fn unreliable_below_min_seeds() {
        let params = ImposedParams::new(0.6).n_mc(50);
        let grid = log_grid(1e1, 1e3, 4);
        let config = SweepConfig::quick().n_seeds(3);

        let sweep = multi_seed_sweep(&params, &grid, &config).unwrap();
        assert_eq!(sweep.aggregate.n_valid, 3);
        assert!(!sweep.aggregate.reliable);
        assert!(sweep.aggregate.ci95.is_none(), "no CI below the seed floor");
        assert!(sweep.aggregate.mean.is_some());
    }

    #[test]
    fn reliable_sweep_has_ci_bracketing_mean() {
        let params = ImposedParams::new(0.6).n_mc(200);
        let grid = log_grid(1e1, 1e4, 6);
        let config = SweepConfig::new().n_seeds(8).n_boot(500);

        let sweep = multi_seed_sweep(&params, &grid, &config).unwrap();
        assert!(sweep.aggregate.reliable);
        let ci = sweep.aggregate.ci95.unwrap();
        let m = sweep.aggregate.mean.unwrap();
        assert!(ci.lo <= m && m <= ci.hi);
    }

    #[test]
    fn aggregate_handles_all_invalid() {
        let agg = aggregate_slopes(&[None, None], 1, 100, 0.05).unwrap();
        assert_eq!(agg.n_valid, 0);
        assert!(agg.mean.is_none());
        assert!(agg.std.is_none());
        assert!(agg.ci95.is_none());
        assert!(!agg.reliable);
    }

    #[test]
    fn single_valid_slope_has_zero_std() {
        let agg = aggregate_slopes(&[Some(-0.5), None], 1, 100, 0.05).unwrap();
        assert_eq!(agg.mean, Some(-0.5));
        assert_eq!(agg.std, Some(0.0));
    }

    #[test]
    fn alpha_sweep_rows_align() {
        let rows = alpha_sweep(&[0.3, 1.0], &log_grid(1e1, 1e3, 4), 50, 2, 9, 100).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].expected + 1.0 / 2.3).abs() < 1e-12);
        assert!((rows[1].expected + 1.0 / 3.0).abs() < 1e-12);
    }
}
