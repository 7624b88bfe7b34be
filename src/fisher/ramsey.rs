//! Fisher information for Ramsey interferometry.
//!
//! Two-level system, phase φ = ωt encoded unitarily, optional dephasing
//! folded into an effective visibility V ∈ (0, 1]:
//!
//! ```text
//! p_±(φ) = (1 ± V cos φ) / 2
//! ```

use super::clamp_prob;

/// Ramsey outcome probabilities `(p_plus, p_minus)`.
pub fn ramsey_probabilities(phi: f64, visibility: f64) -> (f64, f64) {
    let p_plus = 0.5 * (1.0 + visibility * phi.cos());
    (p_plus, 1.0 - p_plus)
}

/// Classical Fisher information for the Ramsey phase at operating point
/// `phi`.
pub fn ramsey_fisher(phi: f64, visibility: f64) -> f64 {
    let (p_plus, p_minus) = ramsey_probabilities(phi, visibility);
    let p_plus = clamp_prob(p_plus);
    let p_minus = clamp_prob(p_minus);

    let dp = -0.5 * visibility * phi.sin();
    dp * dp * (1.0 / p_plus + 1.0 / p_minus)
}

/// Maximum Fisher information over φ, achieved at φ = π/2: `I_max = V²`.
pub fn ramsey_fisher_max(visibility: f64) -> f64 {
    visibility * visibility
}

/// Fisher proxy under dephasing: `I(t) = r · t² · V(t)²` with
/// `V(t) = exp(-γ t)`, capturing the coherence/interrogation-time
/// trade-off. Zero for non-positive `t`.
pub fn ramsey_fisher_dephasing(t: f64, gamma: f64, rate: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let v = (-gamma * t).exp();
    rate * t * t * v * v
}
