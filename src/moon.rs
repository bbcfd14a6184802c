//! # Moon Engine
//!
//! [`Moon`] computes a [`MoonSnapshot`] when it is built and answers the
//! slower queries on demand:
//! - quarter phases, computed on first request and then reused
//! - moonrise/moonset, computed per location on every call
//!
//! The quarter set lives in a [`OnceLock`], so a `Moon` shared between
//! threads fills it once and every caller sees the same value.

use crate::error::MoonError;
use crate::lunar::moontool_ephemeris;
use crate::phase_hunt::{phase_hunt, PhaseQuarter, PhaseQuarterSet};
use crate::rise_set::{moon_times_on, RiseSetResult};
use crate::{GeoLocation, MoonSnapshot};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::OnceLock;

/// Format used by [`Moon::formatted_quarter`]
pub const QUARTER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Names of the eight phases, with "New Moon" repeated for wraparound.
const PHASE_NAMES: [&str; 9] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Third Quarter",
    "Waning Crescent",
    "New Moon",
];

/// Name of the phase, each name covering a sixteenth of a lunation either
/// side of its centre.
///
/// # Example
/// ```
/// use moon_tracker_lib::phase_name;
///
/// assert_eq!(phase_name(0.0), "New Moon");
/// assert_eq!(phase_name(0.5), "Full Moon");
/// assert_eq!(phase_name(0.9999), "New Moon");
/// ```
pub fn phase_name(phase: f64) -> &'static str {
    let index = ((phase + 0.0625) * 8.0).floor();
    PHASE_NAMES[(index.max(0.0) as usize).min(PHASE_NAMES.len() - 1)]
}

/// Lunar data for one instant.
#[derive(Debug)]
pub struct Moon {
    snapshot: MoonSnapshot,
    quarters: OnceLock<PhaseQuarterSet>,
}

impl Moon {
    /// Compute the snapshot for `at`.
    ///
    /// # Errors
    /// [`MoonError::NumericDivergence`] if the Kepler solve does not settle.
    pub fn new(at: DateTime<Utc>) -> Result<Self, MoonError> {
        Ok(Moon {
            snapshot: moontool_ephemeris(at)?,
            quarters: OnceLock::new(),
        })
    }

    /// Compute the snapshot for a Unix timestamp in seconds.
    pub fn from_timestamp(seconds: i64) -> Result<Self, MoonError> {
        let at =
            DateTime::from_timestamp(seconds, 0).ok_or(MoonError::InvalidTimestamp(seconds))?;
        Self::new(at)
    }

    /// Compute the snapshot for the current instant.
    pub fn now() -> Result<Self, MoonError> {
        Self::new(Utc::now())
    }

    pub fn snapshot(&self) -> &MoonSnapshot {
        &self.snapshot
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.snapshot.timestamp
    }

    pub fn phase(&self) -> f64 {
        self.snapshot.phase
    }

    pub fn illumination(&self) -> f64 {
        self.snapshot.illumination
    }

    pub fn age(&self) -> f64 {
        self.snapshot.age
    }

    pub fn distance(&self) -> f64 {
        self.snapshot.distance
    }

    pub fn diameter(&self) -> f64 {
        self.snapshot.diameter
    }

    pub fn sun_distance(&self) -> f64 {
        self.snapshot.sun_distance
    }

    pub fn sun_diameter(&self) -> f64 {
        self.snapshot.sun_diameter
    }

    /// Name of the current phase, e.g. "Waxing Gibbous".
    pub fn phase_name(&self) -> &'static str {
        phase_name(self.snapshot.phase)
    }

    /// Quarter phases around the snapshot instant, computed on first call.
    pub fn quarters(&self) -> Result<&PhaseQuarterSet, MoonError> {
        if let Some(set) = self.quarters.get() {
            return Ok(set);
        }
        let set = phase_hunt(self.snapshot.timestamp)?;
        // A concurrent caller may have won; either way the stored value is returned
        Ok(self.quarters.get_or_init(|| set))
    }

    /// One quarter phase as a UTC instant.
    pub fn quarter(&self, quarter: PhaseQuarter) -> Result<DateTime<Utc>, MoonError> {
        self.quarters()?.datetime(quarter)
    }

    /// One quarter phase looked up by its snake_case name.
    ///
    /// # Errors
    /// [`MoonError::UnknownQuarterName`] for names outside the eight-entry set.
    pub fn quarter_by_name(&self, name: &str) -> Result<DateTime<Utc>, MoonError> {
        self.quarter(name.parse()?)
    }

    /// One quarter phase as `YYYY-MM-DD HH:MM:SS` UTC.
    pub fn formatted_quarter(&self, name: &str) -> Result<String, MoonError> {
        Ok(self
            .quarter_by_name(name)?
            .format(QUARTER_FORMAT)
            .to_string())
    }

    /// UTC calendar date of the snapshot instant.
    pub fn date(&self) -> NaiveDate {
        self.snapshot.timestamp.date_naive()
    }

    /// Moonrise and moonset on the snapshot's UTC calendar date.
    pub fn moon_times(&self, location: GeoLocation) -> RiseSetResult {
        moon_times_on(self.date(), location)
    }
}
