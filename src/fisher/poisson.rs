//! Fisher information for Poisson point processes.
//!
//! Exact Fisher information for an inhomogeneous Poisson process with
//! intensity λ(t; θ):
//!
//! ```text
//! I(θ) = ∫_0^T (∂_θ λ(t;θ))² / λ(t;θ) dt
//! ```
//!
//! The analytic building block for photon-limited continuous monitoring.

use super::trapezoid;

/// Fisher information for a Poisson point process over `[0, t_max]`.
///
/// `intensity` is λ(t, θ) and `d_intensity` its θ-derivative, evaluated on
/// a uniform grid of `n_grid` points. The intensity is clamped below at
/// 1e-15 to keep the integrand finite where it vanishes.
pub fn poisson_fisher<F, G>(
    intensity: F,
    d_intensity: G,
    theta: f64,
    t_max: f64,
    n_grid: usize,
) -> f64
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    assert!(t_max > 0.0, "t_max must be positive");
    assert!(n_grid >= 2, "n_grid must be at least 2");

    let values: Vec<f64> = (0..n_grid)
        .map(|i| {
            let t = t_max * i as f64 / (n_grid - 1) as f64;
            let lam = intensity(t, theta).max(1e-15);
            let dlam = d_intensity(t, theta);
            dlam * dlam / lam
        })
        .collect();

    trapezoid(&values, t_max)
}

/// Average Fisher information rate `I(θ)/T`, for comparing
/// inference-limited against dynamics-limited regimes.
pub fn poisson_fisher_rate<F, G>(
    intensity: F,
    d_intensity: G,
    theta: f64,
    t_max: f64,
    n_grid: usize,
) -> f64
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    poisson_fisher(intensity, d_intensity, theta, t_max, n_grid) / t_max
}
