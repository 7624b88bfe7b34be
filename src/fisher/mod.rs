//! Closed-form Fisher information formulas.
//!
//! Direct algebraic evaluations with no control-flow complexity; no
//! simulations live here. These feed the meeting-point and optimal-time
//! analyses in [`crate::sim::meeting_point`].

pub mod mzi;
pub mod noise;
pub mod ou;
pub mod poisson;
pub mod ramsey;

/// Clamp a probability away from 0 and 1 before dividing by it.
pub(crate) fn clamp_prob(p: f64) -> f64 {
    p.clamp(1e-15, 1.0 - 1e-15)
}

/// Trapezoidal quadrature over a uniform grid spanning `[0, t_max]`.
pub(crate) fn trapezoid(values: &[f64], t_max: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let h = t_max / (values.len() - 1) as f64;
    let interior: f64 = values[1..values.len() - 1].iter().sum();
    h * (0.5 * values[0] + interior + 0.5 * values[values.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_integrates_linear_exactly() {
        // ∫0^1 t dt = 0.5; trapezoid is exact on linear integrands.
        let values: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        assert!((trapezoid(&values, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn trapezoid_degenerate_grid() {
        assert_eq!(trapezoid(&[1.0], 1.0), 0.0);
        assert_eq!(trapezoid(&[], 1.0), 0.0);
    }
}
