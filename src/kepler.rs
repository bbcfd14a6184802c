//! Newton iteration for Kepler's equation `M = E - e·sin(E)`.

use crate::error::MoonError;
use tracing::{debug, warn};

/// Residual below which the eccentric anomaly is accepted
const EPSILON: f64 = 1e-6;

/// Iterations allowed before the solve is declared divergent
pub const MAX_ITERATIONS: usize = 100;

/// Solve Kepler's equation for the eccentric anomaly.
///
/// `m` is the mean anomaly in degrees, `ecc` the orbital eccentricity.
/// Returns the eccentric anomaly in radians.
///
/// # Errors
/// [`MoonError::NumericDivergence`] if the residual is still above `1e-6`
/// after [`MAX_ITERATIONS`] Newton steps.
///
/// # Example
/// ```
/// use moon_tracker_lib::kepler::kepler;
///
/// // A circular orbit has E == M
/// let e = kepler(90.0, 0.0).unwrap();
/// assert!((e - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn kepler(m: f64, ecc: f64) -> Result<f64, MoonError> {
    let m = m.to_radians();
    let mut e = m;

    for iteration in 1..=MAX_ITERATIONS {
        let delta = e - ecc * e.sin() - m;
        e -= delta / (1.0 - ecc * e.cos());
        if delta.abs() <= EPSILON {
            debug!(iterations = iteration, eccentric_anomaly = e, "kepler converged");
            return Ok(e);
        }
    }

    warn!(mean_anomaly = m, ecc, "kepler iteration did not converge");
    Err(MoonError::NumericDivergence {
        routine: "kepler",
        iterations: MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn satisfies_keplers_equation() {
        let ecc = 0.016718;
        for m_deg in [0.0, 12.5, 90.0, 181.0, 270.0, 359.9] {
            let e = kepler(m_deg, ecc).unwrap();
            let m = e - ecc * e.sin();
            assert_abs_diff_eq!(m, f64::to_radians(m_deg), epsilon = 1e-6);
        }
    }

    #[test]
    fn handles_high_eccentricity() {
        let e = kepler(5.0, 0.9).unwrap();
        assert_abs_diff_eq!(e - 0.9 * e.sin(), 5f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn nan_input_diverges_instead_of_looping() {
        assert_eq!(
            kepler(f64::NAN, 0.0167),
            Err(MoonError::NumericDivergence {
                routine: "kepler",
                iterations: MAX_ITERATIONS
            })
        );
    }
}
