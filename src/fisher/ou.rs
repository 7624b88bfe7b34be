//! Fisher information for the Ornstein–Uhlenbeck relaxation rate.
//!
//! Stationary OU process `dX = -γ X dt + √(2D) dW`, parameter of interest
//! γ. Under continuous monitoring over time T the Fisher information is
//! `I_T(γ) ≈ T / (2γ)`.

/// Fisher information rate `I_T / T = 1/(2γ)`.
///
/// # Panics
///
/// Panics if `gamma` is not strictly positive.
pub fn ou_fisher_rate(gamma: f64) -> f64 {
    assert!(gamma > 0.0, "gamma must be positive");
    1.0 / (2.0 * gamma)
}

/// Fisher information for total observation time `t`: `I_T = T/(2γ)`.
pub fn ou_fisher(t: f64, gamma: f64) -> f64 {
    t * ou_fisher_rate(gamma)
}

/// Minimal resolvable δγ from the master inequality:
/// `δγ_min ≳ sqrt(4 D* γ / T)`.
pub fn gamma_min_bound(t: f64, gamma: f64, d_star: f64) -> f64 {
    (4.0 * d_star * gamma / t).sqrt()
}
