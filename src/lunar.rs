//! Moon-phase & medium-precision lunar/solar ephemeris (Moontool, 1980.0 elements)
//!
//! Sun: mean anomaly from the 1980.0 epoch, true anomaly through [`kepler`].
//! Moon: mean elements plus evection, annual equation, two correction terms,
//! equation of the centre and variation.
//! Accuracy: a few minutes of arc, which is ample for phase and age.
//!
//! All angles are carried in degrees; every trigonometric call converts at
//! the call site.

use crate::angle::fixangle;
use crate::error::MoonError;
use crate::kepler::kepler;
use crate::MoonSnapshot;
use chrono::{DateTime, Utc};

/// Julian date of the Unix epoch
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// 1980 January 0.0
const EPOCH: f64 = 2_444_238.5;

// ---- Sun's apparent orbit ---------------------------------------------------
/// Ecliptic longitude of the Sun at epoch 1980.0
const ELONGE: f64 = 278.833540;
/// Ecliptic longitude of the Sun at perigee
const ELONGP: f64 = 282.596403;
/// Eccentricity of Earth's orbit
pub const ECCENT: f64 = 0.016718;
/// Semi-major axis of Earth's orbit, km
const SUN_SMAX: f64 = 1.495985e8;
/// Sun's angular size at semi-major axis distance, degrees
const SUN_ANGSIZ: f64 = 0.533128;

// ---- Moon's orbit, epoch 1980.0 ---------------------------------------------
/// Moon's mean longitude at the epoch
const MMLONG: f64 = 64.975464;
/// Mean longitude of the perigee at the epoch
const MMLONGP: f64 = 349.383063;
/// Mean longitude of the node at the epoch
const MLNODE: f64 = 151.950429;
/// Inclination of the Moon's orbit
const MINC: f64 = 5.145396;
/// Eccentricity of the Moon's orbit
const MECC: f64 = 0.054900;
/// Moon's angular size at semi-major axis distance, degrees
const MANGSIZ: f64 = 0.5181;
/// Semi-major axis of the Moon's orbit, km
const MSMAX: f64 = 384_401.0;
/// Parallax at semi-major axis distance, degrees
const MPARALLAX: f64 = 0.9507;

/// Synodic month (new Moon to new Moon), days
pub const SYNODIC_MONTH: f64 = 29.530_588_68;

/// Convert Unix seconds to a Julian date.
pub fn unix_to_julian(seconds: f64) -> f64 {
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

/// Convert a Julian date to Unix seconds.
pub fn julian_to_unix(jd: f64) -> f64 {
    (jd - UNIX_EPOCH_JD) * 86_400.0
}

/// Unix seconds of `at`, millisecond resolution.
pub(crate) fn unix_seconds(at: &DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

#[inline]
fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

#[inline]
fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

/// Compute the Sun and Moon ephemeris for an instant.
///
/// # Errors
/// Propagates [`MoonError::NumericDivergence`] from the Kepler solve.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use moon_tracker_lib::lunar::moontool_ephemeris;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap();
/// let snap = moontool_ephemeris(at).unwrap();
/// assert!((snap.phase - 0.5).abs() < 0.02); // full moon
/// ```
pub fn moontool_ephemeris(at: DateTime<Utc>) -> Result<MoonSnapshot, MoonError> {
    let jd = unix_to_julian(unix_seconds(&at));

    // ---------- 1. Sun ----------------------------------------------------------
    let day = jd - EPOCH;
    let n = fixangle((360.0 / 365.2422) * day); // mean anomaly
    let m = fixangle(n + ELONGE - ELONGP); // referred to perigee
    let ec = kepler(m, ECCENT)?;
    let ec = ((1.0 + ECCENT) / (1.0 - ECCENT)).sqrt() * (ec / 2.0).tan();
    let ec = 2.0 * ec.atan().to_degrees(); // true anomaly
    let lambda_sun = fixangle(ec + ELONGP);

    let f = (1.0 + ECCENT * cosd(ec)) / (1.0 - ECCENT * ECCENT); // orbital distance factor
    let sun_distance = SUN_SMAX / f;
    let sun_diameter = f * SUN_ANGSIZ;

    // ---------- 2. Moon mean elements ---------------------------------------
    let ml = fixangle(13.176_396_6 * day + MMLONG);
    let mm = fixangle(ml - 0.111_404_1 * day - MMLONGP);
    let mn = fixangle(MLNODE - 0.052_953_9 * day);

    // ---------- 3. Perturbations --------------------------------------------
    let evection = 1.2739 * sind(2.0 * (ml - lambda_sun) - mm);
    let annual_eq = 0.1858 * sind(m);
    let a3 = 0.37 * sind(m);
    let mm_corr = mm + evection - annual_eq - a3;
    let centre = 6.2886 * sind(mm_corr);
    let a4 = 0.214 * sind(2.0 * mm_corr);
    let l_corr = ml + evection + centre - annual_eq + a4;
    let variation = 0.6583 * sind(2.0 * (l_corr - lambda_sun));
    let l_true = l_corr + variation;

    // ---------- 4. Ecliptic coordinates -------------------------------------
    let node = mn - 0.16 * sind(m);
    let y = sind(l_true - node) * cosd(MINC);
    let x = cosd(l_true - node);
    let moon_longitude = fixangle(y.atan2(x).to_degrees() + node);
    let moon_latitude = (sind(l_true - node) * sind(MINC)).asin().to_degrees();

    // ---------- 5. Phase, distance, size ------------------------------------
    let moon_age = l_true - lambda_sun;
    let illumination = (1.0 - cosd(moon_age)) / 2.0;

    let distance = (MSMAX * (1.0 - MECC * MECC)) / (1.0 + MECC * cosd(mm_corr + centre));
    let dist_frac = distance / MSMAX;

    let phase = fixangle(moon_age) / 360.0;

    Ok(MoonSnapshot {
        timestamp: at,
        phase,
        illumination,
        age: SYNODIC_MONTH * phase,
        distance,
        diameter: MANGSIZ / dist_frac,
        sun_distance,
        sun_diameter,
        moon_longitude,
        moon_latitude,
        sun_longitude: lambda_sun,
        parallax: MPARALLAX / dist_frac,
    })
}
