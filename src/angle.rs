//! Angle reduction helpers shared by every model in the crate.

/// Reduce an angle in degrees to the range `[0, 360)`.
pub fn fixangle(a: f64) -> f64 {
    let r = a - 360.0 * (a / 360.0).floor();
    // A tiny negative input rounds up to exactly 360.0
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Fractional part of `x`, shifted into `[0, 1)` for negative inputs.
///
/// Keeps the phase accumulators of the series models bounded.
pub fn frac(x: f64) -> f64 {
    let f = x - x.trunc();
    if f < 0.0 {
        f + 1.0
    } else {
        f
    }
}

/// Reduce an angle in degrees to `[0, 360)` through [`frac`].
pub fn deg_range(x: f64) -> f64 {
    360.0 * frac(x / 360.0)
}
