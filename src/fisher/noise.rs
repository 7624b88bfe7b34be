//! Noise suppression bounds on Fisher information.
//!
//! Generic upper bounds of the form
//!
//! ```text
//! I_T ≤ ∫_0^T İ_ideal(t) · exp(-2 Γ t) dt
//! ```
//!
//! valid for a broad class of Markovian noise channels (dephasing,
//! amplitude damping): noise suppresses distinguishability rates
//! exponentially in time.

use super::trapezoid;

/// Upper bound on `I_T` under a Markovian noise channel of rate
/// `gamma_noise`.
///
/// `fisher_rate_ideal` is the noiseless Fisher rate `İ_ideal(t)`,
/// integrated against the suppression factor on a uniform `n_grid` grid.
///
/// # Panics
///
/// Panics if `gamma_noise` is negative.
pub fn fisher_upper_bound<F>(fisher_rate_ideal: F, t_max: f64, gamma_noise: f64, n_grid: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    assert!(gamma_noise >= 0.0, "gamma_noise must be non-negative");
    assert!(t_max > 0.0, "t_max must be positive");
    assert!(n_grid >= 2, "n_grid must be at least 2");

    let values: Vec<f64> = (0..n_grid)
        .map(|i| {
            let t = t_max * i as f64 / (n_grid - 1) as f64;
            fisher_rate_ideal(t) * (-2.0 * gamma_noise * t).exp()
        })
        .collect();

    trapezoid(&values, t_max)
}
