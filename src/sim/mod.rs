//! Simulation estimators and their shared vocabulary.
//!
//! Three estimator families produce per-flux resolution estimates that all
//! feed the same regression and aggregation layer:
//!
//! - [`fixed_point`] — Class 0A: iterate a self-consistent closure equation.
//! - [`imposed`] — Class 0B: hard-code a target exponent, add Poisson noise.
//! - [`inference`] — Class 1: bracket + bisection search on an expected
//!   log-likelihood ratio, with no scaling assumed.
//!
//! [`meeting_point`] holds the closed-form meeting-point and optimal-time
//! analyses built on the [`crate::fisher`] formulas.

pub mod fixed_point;
pub mod imposed;
pub mod inference;
pub mod meeting_point;

use std::fmt;

use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// What a persisted number *means*. Attached by the producer, propagated
/// verbatim to output, never inferred downstream — conflating classes would
/// misrepresent a pipeline self-test or an algebraic construction as
/// inference evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpistemicClass {
    /// Class 0B: the exponent is hard-coded into the generator. A test
    /// fixture for the fitting machinery, never evidence of an emergent law.
    #[serde(rename = "imposed")]
    Imposed,

    /// Class 0A: the exponent is a consequence of the closure equation's
    /// algebra, found by iterating it. Not data-driven inference.
    #[serde(rename = "fixed-point-construction")]
    FixedPoint,

    /// Class 1: a genuine statistical decision task; no scaling assumed
    /// a priori.
    #[serde(rename = "inference")]
    Inference,
}

impl EpistemicClass {
    /// Stable string form, identical to the serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imposed => "imposed",
            Self::FixedPoint => "fixed-point-construction",
            Self::Inference => "inference",
        }
    }
}

impl fmt::Display for EpistemicClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of (flux, estimated resolution) pairs.
///
/// Flux values are strictly positive and strictly increasing (enforced at
/// push). Resolution estimates are non-negative; `NaN` marks a flux point
/// whose search failed to bracket — kept in place, never dropped or coerced
/// to zero, so downstream fits must filter explicitly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservableCurve {
    phi: Vec<f64>,
    delta: Vec<f64>,
}

impl ObservableCurve {
    /// Create an empty curve with capacity for `n` points.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            phi: Vec::with_capacity(n),
            delta: Vec::with_capacity(n),
        }
    }

    /// Append one (flux, resolution) point.
    ///
    /// # Panics
    ///
    /// Panics if `phi` is not strictly greater than the previous flux value
    /// or not strictly positive, or if `delta` is negative (NaN is allowed
    /// as the "not available" marker).
    pub fn push(&mut self, phi: f64, delta: f64) {
        assert!(phi.is_finite() && phi > 0.0, "flux must be positive");
        if let Some(last) = self.phi.last() {
            assert!(phi > *last, "flux grid must be strictly increasing");
        }
        assert!(!(delta < 0.0), "resolution must be non-negative or NaN");

        self.phi.push(phi);
        self.delta.push(delta);
    }

    /// Flux grid.
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    /// Resolution estimates, aligned with [`Self::phi`].
    pub fn delta(&self) -> &[f64] {
        &self.delta
    }

    /// Number of grid points, including failed ones.
    pub fn len(&self) -> usize {
        self.phi.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.phi.is_empty()
    }

    /// Number of points with a finite, positive resolution estimate.
    pub fn n_valid(&self) -> usize {
        self.delta.iter().filter(|d| d.is_finite() && **d > 0.0).count()
    }
}

/// One estimator of the minimal-resolution observable at a single flux.
///
/// Implementations are immutable parameter records; all randomness flows
/// through the explicitly passed generator, so a fixed `(seed, index)`
/// reproduces bit-identical estimates.
pub trait ResolutionEstimator {
    /// The epistemic class of every estimate this estimator produces.
    fn epistemic_class(&self) -> EpistemicClass;

    /// Human-readable model description for the persisted record.
    fn model(&self) -> String;

    /// Estimate the resolution at flux `phi`.
    ///
    /// Returns `NaN` when the estimate is unavailable (e.g. the search
    /// failed to bracket); hard failures (invalid rates) are errors.
    fn estimate(&self, phi: f64, rng: &mut Xoshiro256PlusPlus) -> Result<f64, SimError>;

    /// The theoretically expected log-log slope, when one exists.
    fn expected_slope(&self) -> Option<f64>;

    /// Simulation parameters as a JSON value for the persisted record.
    fn params_json(&self) -> serde_json::Value;
}

/// Run an estimator across a flux grid, producing one observable curve.
pub fn run_curve<E: ResolutionEstimator + ?Sized>(
    estimator: &E,
    grid: &[f64],
    rng: &mut Xoshiro256PlusPlus,
) -> Result<ObservableCurve, SimError> {
    let mut curve = ObservableCurve::with_capacity(grid.len());
    for &phi in grid {
        let delta = estimator.estimate(phi, rng)?;
        curve.push(phi, delta);
    }
    Ok(curve)
}
