//! Safe Poisson sampling with a Gaussian fallback for extreme rates.

use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

use crate::error::SimError;

/// Rate above which direct Poisson sampling is replaced by a Gaussian
/// approximation with matching mean and variance.
pub const GAUSSIAN_CUTOFF: f64 = 1.0e8;

/// Draw a Poisson-distributed count with mean `lambda`, clamped below at
/// `min_count`.
///
/// Rates above [`GAUSSIAN_CUTOFF`] use `N(lambda, lambda)` rounded to the
/// nearest integer; the relative error of the approximation at that scale is
/// below sampling noise. The clamp floor is the caller's policy — both
/// scaling-law call sites use 1 to keep `1/sqrt(N)` finite.
///
/// # Errors
///
/// Returns [`SimError::InvalidRate`] if `lambda` is negative or non-finite.
/// A negative or NaN rate always indicates an upstream bug, so there is no
/// recovery path.
pub fn poisson_floor<R: Rng + ?Sized>(
    rng: &mut R,
    lambda: f64,
    min_count: u64,
    context: &'static str,
) -> Result<u64, SimError> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(SimError::InvalidRate { lambda, context });
    }

    if lambda == 0.0 {
        return Ok(min_count);
    }

    let raw = if lambda <= GAUSSIAN_CUTOFF {
        // Poisson::new only rejects non-finite or non-positive rates,
        // which are excluded above. The draw is integral-valued f64.
        let dist = Poisson::new(lambda).map_err(|_| SimError::InvalidRate { lambda, context })?;
        dist.sample(rng) as u64
    } else {
        let dist = Normal::new(lambda, lambda.sqrt())
            .map_err(|_| SimError::InvalidRate { lambda, context })?;
        let x = dist.sample(rng).round();
        if x <= 0.0 {
            0
        } else {
            x as u64
        }
    };

    Ok(raw.max(min_count))
}
