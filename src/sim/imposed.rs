//! Class 0B: imposed-exponent generator.
//!
//! Explicitly IMPOSES the target exponent p = 1/(2+α) via δ₀ = Φ^{-p} and
//! perturbs it with Poisson sampling noise. Suitable only for regression
//! and pipeline smoke tests and for verifying that the fitter recovers an
//! imposed slope; its output must never be interpreted as inference
//! evidence or an emergent scaling law, and every record it produces is
//! tagged [`EpistemicClass::Imposed`] with an explicit warning note.

use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use crate::config::DEFAULT_N_MC;
use crate::error::SimError;
use crate::sampling::poisson_floor;
use crate::sim::{EpistemicClass, ResolutionEstimator};
use crate::stats::median;

/// Warning carried verbatim into every persisted imposed-class record.
pub const IMPOSED_WARNING: &str = "Imposed-exponent generator: p = 1/(2+alpha) is hard-coded via \
     delta0 = Phi^(-p). This output must NOT be interpreted as inference \
     evidence or as an emergent scaling law.";

/// Parameters of the imposed-exponent generator. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImposedParams {
    /// Anomalous exponent α in MSD ~ t^α.
    pub alpha: f64,
    /// Monte Carlo trials per flux point; the reported estimate is their
    /// median.
    pub n_mc: usize,
    /// Floor applied to each Poisson draw.
    pub min_count: u64,
}

impl ImposedParams {
    /// Generator for anomalous exponent `alpha` with default trial count.
    ///
    /// # Panics
    ///
    /// Panics if `alpha <= -2`, where the imposed power 1/(2+α) blows up.
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > -2.0, "alpha must exceed -2");
        Self {
            alpha,
            n_mc: DEFAULT_N_MC,
            min_count: 1,
        }
    }

    /// Set the Monte Carlo trial count.
    pub fn n_mc(mut self, n_mc: usize) -> Self {
        assert!(n_mc > 0, "n_mc must be positive");
        self.n_mc = n_mc;
        self
    }

    /// The imposed power p = 1/(2+α).
    pub fn imposed_power(&self) -> f64 {
        1.0 / (2.0 + self.alpha)
    }
}

impl ResolutionEstimator for ImposedParams {
    fn epistemic_class(&self) -> EpistemicClass {
        EpistemicClass::Imposed
    }

    fn model(&self) -> String {
        format!(
            "imposed-exponent generator: delta0 = Phi^(-p), p = 1/(2+alpha), alpha = {}",
            self.alpha
        )
    }

    fn estimate(&self, phi: f64, rng: &mut Xoshiro256PlusPlus) -> Result<f64, SimError> {
        let p = self.imposed_power();
        let delta0 = phi.powf(-p);
        let lam = phi * delta0;

        let mut samples = Vec::with_capacity(self.n_mc);
        for _ in 0..self.n_mc {
            let n = poisson_floor(rng, lam, self.min_count, "imposed generator")?;
            let ratio = n as f64 / (lam + 1e-30);
            samples.push(delta0 * ratio.powf(-p));
        }
        Ok(median(&mut samples))
    }

    fn expected_slope(&self) -> Option<f64> {
        Some(-self.imposed_power())
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
    fn imposed_power_matches_alpha() {
        let params = ImposedParams::new(0.6);
        assert!((params.imposed_power() - 1.0 / 2.6).abs() < 1e-12);
        assert!((params.expected_slope().unwrap() + 1.0 / 2.6).abs() < 1e-12);
    }

    #[test]
    fn estimate_centers_on_baseline() {
        // The median perturbation ratio is near 1, so the estimate should
        // sit close to the imposed baseline Phi^{-p}.
        let params = ImposedParams::new(0.6).n_mc(2_000);
        let phi: f64 = 1_000.0;
        let baseline = phi.powf(-params.imposed_power());
        let mut rng = SeedSequence::new(42).stream(0);
        let est = params.estimate(phi, &mut rng).unwrap();
        assert!(
            (est / baseline - 1.0).abs() < 0.1,
            "estimate {est} far from baseline {baseline}"
        );
    }

    #[test]
    fn deterministic_under_fixed_stream() {
        let params = ImposedParams::new(1.2).n_mc(100);
        let a = params.estimate(500.0, &mut SeedSequence::new(8).stream(1)).unwrap();
        let b = params.estimate(500.0, &mut SeedSequence::new(8).stream(1)).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    #[should_panic(expected = "alpha must exceed -2")]
    fn rejects_degenerate_alpha() {
        let _ = ImposedParams::new(-2.0);
    }
}
