//! # Moon Tracker Core Library
//!
//! This library computes lunar ephemeris data for an arbitrary instant: phase,
//! illuminated fraction, age, Earth–Moon distance, apparent Moon and Sun
//! diameters, and Earth–Sun distance. It also finds the quarter phases around
//! an instant and local moonrise/moonset for a location and calendar date.
//!
//! ## Design Philosophy
//!
//! ### Pure Arithmetic
//! - **No I/O**: every model is a pure function of its inputs
//! - **Immutable snapshots**: [`MoonSnapshot`] is computed once per engine and never changes
//! - **Explicit caching**: the only memoized value is the quarter set held by
//!   [`moon::Moon`]; [`phase_hunt::phase_hunt`] is the un-cached form
//!
//! ### Accuracy
//! The models are classic desk-calculator algorithms:
//! - **Snapshot**: 1980.0 orbital elements with five perturbation terms
//! - **Quarters**: mean-phase polynomial plus periodic corrections, good to minutes
//! - **Rise/set**: compact series good to a few arc-minutes, scanned per hour
//!
//! This is not a general ephemeris; no planets, no multi-century accuracy.
//!
//! ### Data Flow
//! 1. **Construct**: instant → [`lunar::moontool_ephemeris`] → [`MoonSnapshot`]
//! 2. **Quarters**: first request → [`phase_hunt::phase_hunt`] → cached [`PhaseQuarterSet`]
//! 3. **Rise/set**: UTC date + [`GeoLocation`] → [`rise_set::moon_times_on`] → [`RiseSetResult`]
//!
//! ## Core Types
//! - [`MoonSnapshot`]: all quantities computed at construction
//! - [`GeoLocation`]: observer latitude/longitude
//! - [`moon::Moon`]: the engine tying the models together

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod angle;
pub mod config;
pub mod error;
pub mod kepler;
pub mod lunar;
pub mod minimoon;
pub mod moon;
pub mod phase_hunt;
pub mod quad;
pub mod renderer;
pub mod rise_set;

pub use error::MoonError;
pub use moon::{phase_name, Moon};
pub use phase_hunt::{PhaseQuarter, PhaseQuarterSet};
pub use rise_set::RiseSetResult;

/// Sun and Moon quantities at one instant.
///
/// `phase` runs from 0 (new) through 0.5 (full) back towards 1; values just
/// below 1 are also new moon. `age` is always `phase` times the synodic month.
///
/// # Example
/// ```
/// use moon_tracker_lib::Moon;
///
/// let moon = Moon::from_timestamp(1_700_000_000).unwrap();
/// let snap = moon.snapshot();
/// assert!((0.0..1.0).contains(&snap.phase));
/// assert!((0.0..=1.0).contains(&snap.illumination));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonSnapshot {
    /// Instant described
    pub timestamp: DateTime<Utc>,
    /// Fraction of the lunation elapsed, `[0, 1)`
    pub phase: f64,
    /// Illuminated fraction of the disk, `[0, 1]`
    pub illumination: f64,
    /// Days since new moon
    pub age: f64,
    /// Earth–Moon distance, km
    pub distance: f64,
    /// Moon's angular diameter, degrees
    pub diameter: f64,
    /// Earth–Sun distance, km
    pub sun_distance: f64,
    /// Sun's angular diameter, degrees
    pub sun_diameter: f64,
    /// Moon's geocentric ecliptic longitude, degrees
    pub moon_longitude: f64,
    /// Moon's geocentric ecliptic latitude, degrees
    pub moon_latitude: f64,
    /// Sun's geocentric ecliptic longitude, degrees
    pub sun_longitude: f64,
    /// Moon's horizontal parallax, degrees
    pub parallax: f64,
}

/// Observer position in degrees, east longitude positive.
///
/// Only [`GeoLocation::new`] builds one, so every value is in range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    /// Validate and build a location.
    ///
    /// # Errors
    /// [`MoonError::InvalidLocation`] unless latitude is within ±90 and
    /// longitude within ±180.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MoonError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(MoonError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(GeoLocation {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_bounds_are_enforced() {
        assert!(GeoLocation::new(90.0, -180.0).is_ok());
        assert!(GeoLocation::new(-90.0, 180.0).is_ok());
        assert!(GeoLocation::new(90.5, 0.0).is_err());
        assert!(GeoLocation::new(0.0, 181.0).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
        assert!(GeoLocation::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn accessors_return_validated_coordinates() {
        let tokyo = GeoLocation::new(35.68, 139.77).unwrap();
        assert_eq!(tokyo.latitude(), 35.68);
        assert_eq!(tokyo.longitude(), 139.77);
    }
}
