//! Parabolic interpolation through three equally spaced samples.
//!
//! Fits `f(x) = a·x² + b·x + c` through `(-1, ym)`, `(0, yz)`, `(+1, yp)` and
//! reports the extremum and the zero crossings inside `(-1, 1)`. Nothing here
//! is astronomy specific; the rise/set scan feeds it altitude samples.

/// Result of [`quad`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadRoots {
    /// Number of roots strictly inside `(-1, 1)`: 0, 1 or 2
    pub count: u8,
    /// First root; holds the only in-range root when `count == 1`
    pub z1: f64,
    /// Second root
    pub z2: f64,
    /// Abscissa of the extremum (centre sample for a straight line)
    pub xe: f64,
    /// Ordinate of the extremum
    pub ye: f64,
}

/// Curvature below which the three samples are treated as a straight line
const LINEAR_EPSILON: f64 = 1e-12;

/// Fit a parabola through `(ym, yz, yp)` and locate its zero crossings.
///
/// # Example
/// ```
/// use moon_tracker_lib::quad::quad;
///
/// let r = quad(1.0, -1.0, 1.0); // 2x² - 1: roots near ±0.71
/// assert_eq!(r.count, 2);
/// assert!(r.z1 < 0.0 && r.z2 > 0.0);
/// ```
pub fn quad(ym: f64, yz: f64, yp: f64) -> QuadRoots {
    let a = 0.5 * (ym + yp) - yz;
    let b = 0.5 * (yp - ym);
    let c = yz;

    if a.abs() < LINEAR_EPSILON {
        return linear(b, c);
    }

    let xe = -b / (2.0 * a);
    let ye = (a * xe + b) * xe + c;
    let dis = b * b - 4.0 * a * c;

    let mut roots = QuadRoots {
        count: 0,
        z1: 0.0,
        z2: 0.0,
        xe,
        ye,
    };
    if dis <= 0.0 {
        return roots;
    }

    let dx = 0.5 * dis.sqrt() / a.abs();
    roots.z1 = xe - dx;
    roots.z2 = xe + dx;
    roots.count = u8::from(roots.z1.abs() < 1.0) + u8::from(roots.z2.abs() < 1.0);
    if roots.z1 < -1.0 {
        roots.z1 = roots.z2;
    }
    roots
}

/// Degenerate fit: the samples lie on `b·x + c`.
fn linear(b: f64, c: f64) -> QuadRoots {
    let mut roots = QuadRoots {
        count: 0,
        z1: 0.0,
        z2: 0.0,
        xe: 0.0,
        ye: c,
    };
    if b != 0.0 {
        let z = -c / b;
        if z.abs() < 1.0 {
            roots.count = 1;
            roots.z1 = z;
            roots.z2 = z;
        }
    }
    roots
}
