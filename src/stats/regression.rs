//! Log-log ordinary least squares for power-law exponents.

use crate::error::SimError;

/// A fitted power law `delta ≈ exp(intercept) * phi^slope`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLogFit {
    /// Power-law exponent (slope in log-log space).
    pub slope: f64,
    /// Intercept in log space.
    pub intercept: f64,
    /// Number of points that survived filtering and entered the fit.
    pub n_used: usize,
}

/// Fit `log(delta) = slope * log(phi) + intercept` by OLS.
///
/// Pairs where `delta` is non-finite or non-positive are filtered out
/// before taking logarithms; a failed search therefore weakens the fit
/// instead of poisoning it. `phi` values are assumed positive (the grid
/// constructor guarantees it).
///
/// # Errors
///
/// Returns [`SimError::InsufficientData`] if fewer than `min_points` valid
/// pairs remain. Single-curve fits use `min_points = 2`; the inference
/// sweep uses 5 so a mostly-failed seed reports its slope as unavailable
/// rather than extrapolated from a couple of points.
pub fn loglog_fit(phi: &[f64], delta: &[f64], min_points: usize) -> Result<LogLogFit, SimError> {
    assert_eq!(phi.len(), delta.len(), "phi/delta length mismatch");

    let pairs: Vec<(f64, f64)> = phi
        .iter()
        .zip(delta.iter())
        .filter(|(p, d)| p.is_finite() && **p > 0.0 && d.is_finite() && **d > 0.0)
        .map(|(p, d)| (p.ln(), d.ln()))
        .collect();

    let n = pairs.len();
    if n < min_points.max(2) {
        return Err(SimError::InsufficientData {
            needed: min_points.max(2),
            got: n,
            context: "log-log fit",
        });
    }

    let nf = n as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / nf;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / nf;

    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mx) * (x - mx)).sum();
    let sxy: f64 = pairs.iter().map(|(x, y)| (x - mx) * (y - my)).sum();

    if sxx == 0.0 {
        return Err(SimError::InsufficientData {
            needed: 2,
            got: 1,
            context: "log-log fit (degenerate abscissa)",
        });
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    Ok(LogLogFit {
        slope,
        intercept,
        n_used: n,
    })
}
