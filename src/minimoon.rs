//! Low-precision lunar position for horizon work.
//!
//! A compact periodic series in Julian centuries since J2000.0, good to a few
//! arc-minutes in right ascension and declination. It is cheap enough to
//! evaluate a dozen times per rise/set scan.

use crate::angle::{deg_range, frac};
use std::f64::consts::TAU;

/// Modified Julian date of J2000.0
pub const MJD_J2000: f64 = 51_544.5;

/// Arc-seconds per radian
const ARC: f64 = 206_264.806_2;
const COS_EPS: f64 = 0.91748;
const SIN_EPS: f64 = 0.39778;

/// Geocentric equatorial position of the Moon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equatorial {
    /// Declination, degrees
    pub dec: f64,
    /// Right ascension, hours in `[0, 24)`
    pub ra: f64,
}

/// Moon position at `t` Julian centuries since J2000.0.
pub fn minimoon(t: f64) -> Equatorial {
    let lo = frac(0.606_433 + 1336.855_225 * t);
    let l = TAU * frac(0.374_897 + 1325.552_410 * t);
    let ls = TAU * frac(0.993_133 + 99.997_361 * t);
    let d = TAU * frac(0.827_361 + 1236.853_086 * t);
    let f = TAU * frac(0.259_086 + 1342.227_825 * t);
    let (l2, d2, f2) = (2.0 * l, 2.0 * d, 2.0 * f);

    let sinls = ls.sin();
    let sinf2 = f2.sin();

    // Longitude perturbations, arc-seconds
    let dl = 22_640.0 * l.sin() - 4586.0 * (l - d2).sin()
        + 2370.0 * d2.sin()
        + 769.0 * l2.sin()
        - 668.0 * sinls
        - 412.0 * sinf2
        - 212.0 * (l2 - d2).sin()
        - 206.0 * (l + ls - d2).sin()
        + 192.0 * (l + d2).sin()
        - 165.0 * (ls - d2).sin()
        - 125.0 * d.sin()
        - 110.0 * (l + ls).sin()
        + 148.0 * (l - ls).sin()
        - 55.0 * (f2 - d2).sin();

    // Latitude perturbations, arc-seconds
    let s = f + (dl + 412.0 * sinf2 + 541.0 * sinls) / ARC;
    let h = f - d2;
    let n = -526.0 * h.sin() + 44.0 * (l + h).sin() - 31.0 * (h - l).sin() - 23.0 * (ls + h).sin()
        + 11.0 * (h - ls).sin()
        - 25.0 * (f - l2).sin()
        + 21.0 * (f - l).sin();

    let lambda = TAU * frac(lo + dl / 1_296_000.0);
    let beta = (18_520.0 * s.sin() + n) / ARC;

    // Ecliptic to equatorial
    let cb = beta.cos();
    let x = cb * lambda.cos();
    let v = cb * lambda.sin();
    let w = beta.sin();
    let y = COS_EPS * v - SIN_EPS * w;
    let z = SIN_EPS * v + COS_EPS * w;
    let rho = (1.0 - z * z).sqrt();

    let dec = (z / rho).atan().to_degrees();
    let mut ra = (48.0 / TAU) * (y / (x + rho)).atan();
    if ra < 0.0 {
        ra += 24.0;
    }

    Equatorial { dec, ra }
}

/// Local mean sidereal time in hours for a modified Julian date and east longitude.
pub fn lmst(mjd: f64, longitude: f64) -> f64 {
    let d = mjd - MJD_J2000;
    let t = d / 36_525.0;
    let lst = deg_range(
        280.460_618_39 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    );
    lst / 15.0 + longitude / 15.0
}

/// Sine of the Moon's altitude `hour` hours after `mjd` for an observer.
pub fn sin_alt(mjd: f64, hour: f64, longitude: f64, cos_lat: f64, sin_lat: f64) -> f64 {
    let mjd = mjd + hour / 24.0;
    let t = (mjd - MJD_J2000) / 36_525.0;
    let pos = minimoon(t);

    let tau = 15.0 * (lmst(mjd, longitude) - pos.ra);
    let dec = pos.dec.to_radians();
    sin_lat * dec.sin() + cos_lat * dec.cos() * tau.to_radians().cos()
}
