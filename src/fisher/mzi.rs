//! Fisher information for Mach–Zehnder interferometry.
//!
//! Single-photon interferometer with a phase shift φ in one arm and losses
//! encoded via effective visibility. Formally identical to Ramsey
//! interferometry, interpreted as a spatial/optical interferometer — kept
//! separate so meeting-point records name the physical setting they came
//! from.

use super::clamp_prob;

/// Mach–Zehnder output probabilities `(p_plus, p_minus)`.
pub fn mzi_probabilities(phi: f64, visibility: f64) -> (f64, f64) {
    let p_plus = 0.5 * (1.0 + visibility * phi.cos());
    (p_plus, 1.0 - p_plus)
}

/// Classical Fisher information for the MZI phase at operating point `phi`.
pub fn mzi_fisher(phi: f64, visibility: f64) -> f64 {
    let (p_plus, p_minus) = mzi_probabilities(phi, visibility);
    let p_plus = clamp_prob(p_plus);
    let p_minus = clamp_prob(p_minus);

    let dp = -0.5 * visibility * phi.sin();
    dp * dp * (1.0 / p_plus + 1.0 / p_minus)
}

/// Maximum Fisher information over φ: `I_max = V²`.
pub fn mzi_fisher_max(visibility: f64) -> f64 {
    visibility * visibility
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fisher::ramsey::ramsey_fisher;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn formally_identical_to_ramsey() {
        for phi in [0.1, 0.9, 2.5] {
            assert_eq!(mzi_fisher(phi, 0.7), ramsey_fisher(phi, 0.7));
        }
    }

    #[test]
    fn max_at_quadrature() {
        let v = 0.7;
        assert!((mzi_fisher(FRAC_PI_2, v) - mzi_fisher_max(v)).abs() < 1e-12);
    }
}
