//! Class 1: inference-only minimal-detectable-effect search.
//!
//! Two-window experiment distinguishing H0: Δt = 0 from H1: Δt > 0 by the
//! expected log-likelihood ratio. For each flux Φ, find the smallest Δt
//! whose mean LLR reaches the distinguishability threshold D*, by bracket
//! doubling plus bisection. No scaling is assumed a priori — the fitted
//! exponent is whatever the decision task produces.
//!
//! Forward model: Brownian displacement between windows ΔX ~ N(0, 2·D·Δt);
//! photon counts per window N₁, N₂ ~ Poisson(Φ·T_obs); per-photon
//! localization noise σ_ph gives a per-window estimate noise σ_ph²/N. Δt
//! enters the *variance*, not the mean, so the small-Δt asymptotic here is
//! typically Δt_min ∝ Φ^{-1} — a valid inference-only baseline, but not the
//! canonical √N (Φ^{-1/2}) regime.

use log::warn;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use crate::error::SimError;
use crate::sampling::poisson_floor;
use crate::sim::{EpistemicClass, ResolutionEstimator};

/// How the mean log-likelihood ratio is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LlrMethod {
    /// Exact Gaussian KL divergence per count draw. Canonical: the only
    /// remaining randomness is the Poisson observation channel, which is
    /// the intended source of finite-statistics variability.
    #[default]
    AnalyticKl,

    /// Empirical mean of sampled log-likelihood ratios, with displacement
    /// and localization noise fully drawn. Noisier estimator of the same
    /// expectation; kept for noise-realism studies.
    Empirical,
}

/// Parameters of the inference search. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InferenceParams {
    /// Diffusion coefficient D (m²/s).
    pub d: f64,
    /// Per-photon localization noise σ_ph (m).
    pub sigma_ph: f64,
    /// Observation window duration T_obs (s).
    pub t_obs: f64,
    /// Distinguishability threshold D* on the mean LLR.
    pub d_star: f64,
    /// Floor on photon counts per window, avoiding division by zero.
    pub min_photons: u64,
    /// Monte Carlo trials per (Φ, Δt) evaluation.
    pub n_trials: usize,
    /// LLR estimator variant.
    pub method: LlrMethod,
    /// First bracket candidate Δt (s).
    pub dt_seed: f64,
    /// Absolute ceiling on Δt (s); reaching it without success yields the
    /// "not found" sentinel.
    pub dt_ceiling: f64,
    /// Cap on bracket doublings.
    pub max_doublings: usize,
    /// Bisection iterations once bracketed.
    pub bisect_iters: usize,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            d: 1e-12,
            sigma_ph: 2e-7,
            t_obs: 5e-3,
            d_star: 1.0,
            min_photons: 1,
            n_trials: 20_000,
            method: LlrMethod::AnalyticKl,
            dt_seed: 1e-9,
            dt_ceiling: 10.0,
            max_doublings: 80,
            bisect_iters: 35,
        }
    }
}

impl InferenceParams {
    /// Default parameters (D = 1e-12, σ_ph = 2e-7, T_obs = 5 ms, D* = 1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diffusion coefficient.
    pub fn d(mut self, d: f64) -> Self {
        assert!(d > 0.0, "D must be positive");
        self.d = d;
        self
    }

    /// Set the per-photon localization noise.
    pub fn sigma_ph(mut self, sigma_ph: f64) -> Self {
        assert!(sigma_ph > 0.0, "sigma_ph must be positive");
        self.sigma_ph = sigma_ph;
        self
    }

    /// Set the window duration.
    pub fn t_obs(mut self, t_obs: f64) -> Self {
        assert!(t_obs > 0.0, "T_obs must be positive");
        self.t_obs = t_obs;
        self
    }

    /// Set the distinguishability threshold.
    pub fn d_star(mut self, d_star: f64) -> Self {
        assert!(d_star >= 0.0, "D* must be non-negative");
        self.d_star = d_star;
        self
    }

    /// Set the trial count per LLR evaluation.
    pub fn n_trials(mut self, n_trials: usize) -> Self {
        assert!(n_trials > 0, "n_trials must be positive");
        self.n_trials = n_trials;
        self
    }

    /// Select the LLR estimator variant.
    pub fn method(mut self, method: LlrMethod) -> Self {
        self.method = method;
        self
    }
}

/// KL divergence KL(N(0, v1) || N(0, v0)) for zero-mean 1D Gaussians:
/// `0.5 * (v1/v0 - 1 - ln(v1/v0))`.
///
/// This equals the mean log-likelihood ratio under H1, computed exactly to
/// avoid injecting sampling noise into the search.
pub fn kl_gauss_zero_mean(v1: f64, v0: f64) -> f64 {
    let r = v1 / v0;
    0.5 * (r - 1.0 - r.ln())
}

/// Monte Carlo estimate of the mean LLR under H1 at (Φ, Δt).
///
/// # Errors
///
/// Returns [`SimError::InvalidRate`] if the photon rate Φ·T_obs is invalid.
pub fn mean_llr(
    phi: f64,
    dt: f64,
    params: &InferenceParams,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<f64, SimError> {
    let lam = phi * params.t_obs;
    let v_diff = 2.0 * params.d * dt;
    let sigma2 = params.sigma_ph * params.sigma_ph;

    let mut acc = 0.0;
    for _ in 0..params.n_trials {
        let n1 = poisson_floor(rng, lam, params.min_photons, "inference window 1")?;
        let n2 = poisson_floor(rng, lam, params.min_photons, "inference window 2")?;

        // Localization-only variance of the two-window difference under H0.
        let v0 = sigma2 * (1.0 / n1 as f64 + 1.0 / n2 as f64);
        let v1 = v0 + v_diff;

        acc += match params.method {
            LlrMethod::AnalyticKl => kl_gauss_zero_mean(v1, v0),
            LlrMethod::Empirical => {
                // Draw the observed difference under H1 and score it.
                let z: f64 = StandardNormal.sample(rng);
                let y = z * v1.sqrt();
                0.5 * (v0 / v1).ln() + 0.5 * y * y * (1.0 / v0 - 1.0 / v1)
            }
        };
    }
    Ok(acc / params.n_trials as f64)
}

/// Diagnostics from one minimal-Δt search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchDiag {
    /// Mean LLR at the returned Δt (or at the ceiling on failure).
    pub llr_at_dt: f64,
    /// Last failing bracket bound (NaN if the search returned 0 or failed).
    pub bracket_lo: f64,
    /// Last succeeding bracket bound (NaN on failure).
    pub bracket_hi: f64,
    /// Number of doublings performed.
    pub doublings: usize,
    /// Whether the threshold was reached at all.
    pub found: bool,
}

/// Find the minimal Δt with mean LLR ≥ D* at flux `phi`.
///
/// Pure numeric search, no scaling assumed: (1) Δt = 0 is checked first and
/// returned immediately if it already meets the threshold; (2) exponential
/// doubling from `dt_seed`, capped by `max_doublings` and `dt_ceiling`; (3)
/// fixed-count bisection returning the succeeding upper bound. Failure to
/// bracket yields `None` — an explicit "not found", never a coerced zero or
/// the ceiling itself.
///
/// # Errors
///
/// Returns [`SimError::InvalidRate`] on invalid photon rates.
pub fn find_dt_min(
    phi: f64,
    params: &InferenceParams,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(Option<f64>, SearchDiag), SimError> {
    let llr_at_zero = mean_llr(phi, 0.0, params, rng)?;
    if llr_at_zero >= params.d_star {
        return Ok((
            Some(0.0),
            SearchDiag {
                llr_at_dt: llr_at_zero,
                bracket_lo: f64::NAN,
                bracket_hi: f64::NAN,
                doublings: 0,
                found: true,
            },
        ));
    }

    let mut dt_lo = 0.0;
    let mut dt_hi = params.dt_seed;
    let mut llr_hi = mean_llr(phi, dt_hi, params, rng)?;
    let mut doublings = 0;

    while llr_hi < params.d_star && dt_hi < params.dt_ceiling && doublings < params.max_doublings {
        dt_lo = dt_hi;
        dt_hi *= 2.0;
        llr_hi = mean_llr(phi, dt_hi, params, rng)?;
        doublings += 1;
    }

    if llr_hi < params.d_star {
        return Ok((
            None,
            SearchDiag {
                llr_at_dt: llr_hi,
                bracket_lo: f64::NAN,
                bracket_hi: f64::NAN,
                doublings,
                found: false,
            },
        ));
    }

    for _ in 0..params.bisect_iters {
        let dt_mid = 0.5 * (dt_lo + dt_hi);
        let llr_mid = mean_llr(phi, dt_mid, params, rng)?;
        if llr_mid >= params.d_star {
            dt_hi = dt_mid;
            llr_hi = llr_mid;
        } else {
            dt_lo = dt_mid;
        }
    }

    Ok((
        Some(dt_hi),
        SearchDiag {
            llr_at_dt: llr_hi,
            bracket_lo: dt_lo,
            bracket_hi: dt_hi,
            doublings,
            found: true,
        },
    ))
}

/// Like [`find_dt_min`], but a failed bracket is a hard
/// [`SimError::SearchExhausted`] instead of a sentinel.
///
/// For callers probing a single operating point, where "no detectable Δt"
/// should stop the computation rather than flow into a fit.
pub fn find_dt_min_strict(
    phi: f64,
    params: &InferenceParams,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<(f64, SearchDiag), SimError> {
    let (dt_min, diag) = find_dt_min(phi, params, rng)?;
    match dt_min {
        Some(dt) => Ok((dt, diag)),
        None => Err(SimError::SearchExhausted {
            phi,
            dt_ceiling: params.dt_ceiling,
            llr_at_ceiling: diag.llr_at_dt,
        }),
    }
}

impl ResolutionEstimator for InferenceParams {
    fn epistemic_class(&self) -> EpistemicClass {
        EpistemicClass::Inference
    }

    fn model(&self) -> String {
        format!(
            "two-window diffusion time inference via mean LLR ({})",
            match self.method {
                LlrMethod::AnalyticKl => "exact Gaussian KL",
                LlrMethod::Empirical => "empirical sampled LLR",
            }
        )
    }

    fn estimate(&self, phi: f64, rng: &mut Xoshiro256PlusPlus) -> Result<f64, SimError> {
        let (dt_min, diag) = find_dt_min(phi, self, rng)?;
        match dt_min {
            Some(dt) => Ok(dt),
            None => {
                warn!(
                    "bracket search exhausted at phi={phi}: mean LLR {:.3e} below D*={} \
                     after {} doublings",
                    diag.llr_at_dt, self.d_star, diag.doublings
                );
                Ok(f64::NAN)
            }
        }
    }

    fn expected_slope(&self) -> Option<f64> {
        // Small-dt asymptotic: KL ~ 0.25 (v_diff/v0)^2 with v0 ~ O(1/Phi).
        Some(-1.0)
    }

    fn params_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeedSequence;

    #[test]
    fn kl_zero_at_equal_variances() {
        assert_eq!(kl_gauss_zero_mean(1.0, 1.0), 0.0);
    }

    #[test]
    fn kl_exact_value() {
        // KL(N(0,2) || N(0,1)) = 0.5 * (2 - 1 - ln 2).
        let expect = 0.5 * (1.0 - 2f64.ln());
        assert!((kl_gauss_zero_mean(2.0, 1.0) - expect).abs() < 1e-15);
    }

    #[test]
    fn kl_positive_for_distinct_variances() {
        assert!(kl_gauss_zero_mean(1.5, 1.0) > 0.0);
        assert!(kl_gauss_zero_mean(0.5, 1.0) > 0.0);
    }

    #[test]
    fn zero_threshold_returns_zero_immediately() {
        let params = InferenceParams::new().d_star(0.0).n_trials(100);
        let mut rng = SeedSequence::new(1).stream(0);
        let (dt, diag) = find_dt_min(1e6, &params, &mut rng).unwrap();
        assert_eq!(dt, Some(0.0));
        assert_eq!(diag.doublings, 0, "must not enter bracketing");
    }

    #[test]
    fn unreachable_threshold_yields_sentinel() {
        // With D* far above anything 2 D dt can produce below the ceiling,
        // the search must report "not found", never the ceiling value.
        let mut params = InferenceParams::new().n_trials(50);
        params.d_star = 1e12;
        params.dt_ceiling = 1e-6;
        params.max_doublings = 12;

        let mut rng = SeedSequence::new(2).stream(0);
        let (dt, diag) = find_dt_min(1e6, &params, &mut rng).unwrap();
        assert_eq!(dt, None);
        assert!(!diag.found);
        assert!(diag.llr_at_dt < params.d_star);
    }

    #[test]
    fn found_dt_meets_threshold() {
        let params = InferenceParams::new().n_trials(500);
        let ss = SeedSequence::new(3);
        let (dt, diag) = find_dt_min(1e6, &params, &mut ss.stream(0)).unwrap();
        let dt = dt.expect("threshold reachable at this flux");
        assert!(dt > 0.0);
        assert!(
            diag.llr_at_dt >= params.d_star,
            "returned upper bound must satisfy the criterion"
        );

        // Fresh stream: the analytic mean LLR at the found dt should be at
        // threshold up to Monte Carlo noise in the count draws.
        let llr = mean_llr(1e6, dt, &params, &mut ss.stream(1)).unwrap();
        assert!(
            (llr / params.d_star - 1.0).abs() < 0.2,
            "LLR at dt_min was {llr}"
        );
    }

    #[test]
    fn higher_flux_resolves_smaller_dt() {
        let params = InferenceParams::new().n_trials(500);
        let ss = SeedSequence::new(4);
        let (lo, _) = find_dt_min(1e5, &params, &mut ss.stream(0)).unwrap();
        let (hi, _) = find_dt_min(1e7, &params, &mut ss.stream(1)).unwrap();
        assert!(hi.unwrap() < lo.unwrap());
    }

    #[test]
    fn empirical_variant_tracks_analytic() {
        // Same expectation, more sampling noise: the two estimators must
        // agree within Monte Carlo error at a moderately large dt.
        let base = InferenceParams::new().n_trials(20_000);
        let dt = 1e-3;
        let phi = 1e6;
        let ss = SeedSequence::new(5);

        let analytic = mean_llr(phi, dt, &base, &mut ss.stream(0)).unwrap();
        let empirical = mean_llr(
            phi,
            dt,
            &base.method(LlrMethod::Empirical),
            &mut ss.stream(1),
        )
        .unwrap();

        assert!(
            (empirical / analytic - 1.0).abs() < 0.1,
            "empirical {empirical} vs analytic {analytic}"
        );
    }
}
