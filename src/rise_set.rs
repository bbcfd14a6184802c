//! # Moonrise and Moonset
//!
//! Scans one local day in two-hour windows. Each window samples the Moon's
//! altitude sine at the start, middle and end, and a parabola through the
//! three samples ([`quad`]) locates any horizon crossing inside it.
//!
//! ## Time Zone
//! Results are civil times in the zone implied by the longitude,
//! `trunc(longitude / 15)` hours east of UTC. This is local apparent time,
//! not a political time zone.
//!
//! ## Missing Events
//! Near the poles, or on the one day per lunation when the Moon rises (or
//! sets) just after midnight of the following day, a scan can finish without
//! one of the events. [`RiseSetResult`] reports that as `None`; the
//! `*_or_sentinel` accessors reproduce the classic behaviour of substituting
//! midnight at the end of the day.

use crate::error::MoonError;
use crate::minimoon::sin_alt;
use crate::quad::quad;
use crate::GeoLocation;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sine of the altitude at which the Moon's upper limb touches the horizon
/// (parallax, semi-diameter and refraction folded together).
pub const SIN_H0: f64 = 0.002_327_105_6;

/// Moonrise and moonset for one calendar day at one location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiseSetResult {
    /// Calendar date that was scanned
    pub date: NaiveDate,
    /// Hours east of UTC of the longitude-implied zone
    pub utc_offset_hours: i32,
    /// Moonrise in local civil time, if it occurs on this day
    pub moonrise: Option<NaiveDateTime>,
    /// Moonset in local civil time, if it occurs on this day
    pub moonset: Option<NaiveDateTime>,
    /// Midnight at the end of the scanned day
    pub day_end: NaiveDateTime,
}

impl RiseSetResult {
    /// True if the scan found a moonrise.
    pub fn rise_occurred(&self) -> bool {
        self.moonrise.is_some()
    }

    /// True if the scan found a moonset.
    pub fn set_occurred(&self) -> bool {
        self.moonset.is_some()
    }

    /// Moonrise, or the end-of-day midnight when there is none.
    pub fn moonrise_or_sentinel(&self) -> NaiveDateTime {
        self.moonrise.unwrap_or(self.day_end)
    }

    /// Moonset, or the end-of-day midnight when there is none.
    pub fn moonset_or_sentinel(&self) -> NaiveDateTime {
        self.moonset.unwrap_or(self.day_end)
    }

    /// Moonrise, failing with [`MoonError::NoObservableEvent`] when there is none.
    pub fn require_moonrise(&self) -> Result<NaiveDateTime, MoonError> {
        self.moonrise.ok_or(MoonError::NoObservableEvent {
            event: "rise",
            date: self.date,
        })
    }

    /// Moonset, failing with [`MoonError::NoObservableEvent`] when there is none.
    pub fn require_moonset(&self) -> Result<NaiveDateTime, MoonError> {
        self.moonset.ok_or(MoonError::NoObservableEvent {
            event: "set",
            date: self.date,
        })
    }

    /// Moonrise as a UTC instant.
    pub fn moonrise_utc(&self) -> Option<DateTime<Utc>> {
        self.moonrise.map(|t| self.to_utc(t))
    }

    /// Moonset as a UTC instant.
    pub fn moonset_utc(&self) -> Option<DateTime<Utc>> {
        self.moonset.map(|t| self.to_utc(t))
    }

    /// Moonrise in Unix seconds.
    pub fn moonrise_timestamp(&self) -> Option<i64> {
        self.moonrise_utc().map(|t| t.timestamp())
    }

    /// Moonset in Unix seconds.
    pub fn moonset_timestamp(&self) -> Option<i64> {
        self.moonset_utc().map(|t| t.timestamp())
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::hours(self.utc_offset_hours as i64)).and_utc()
    }
}

/// Modified Julian date (JD − 2400000.5) at 0h of a calendar date.
///
/// Gregorian from 1582-10-15, Julian before.
pub fn modified_julian_date(year: i32, month: u32, day: u32) -> f64 {
    let (mut year, mut month) = (year as i64, month as i64);
    let day = day as i64;
    if month <= 2 {
        month += 12;
        year -= 1;
    }

    let stamp = 10_000 * year + 100 * month + day;
    let b = if stamp <= 15_821_004 {
        (year + 4716) / 4 - 1181
    } else {
        year.div_euclid(400) - year.div_euclid(100) + year.div_euclid(4)
    };

    let a = 365 * year - 679_004;
    (a + b + (30.6001 * (month + 1) as f64) as i64 + day) as f64
}

/// Round fractional hours to the nearest whole minute.
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0 + 0.5).floor() as i64
}

/// Moonrise and moonset on a calendar date at a location.
///
/// # Errors
/// [`MoonError::InvalidDate`] if the date does not exist.
///
/// # Example
/// ```
/// use moon_tracker_lib::{rise_set::moon_times, GeoLocation};
///
/// let greenwich = GeoLocation::new(51.4769, 0.0).unwrap();
/// let times = moon_times(2024, 1, 11, greenwich).unwrap();
/// assert!(times.rise_occurred() || times.set_occurred());
/// ```
pub fn moon_times(
    year: i32,
    month: u32,
    day: u32,
    location: GeoLocation,
) -> Result<RiseSetResult, MoonError> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(MoonError::InvalidDate { year, month, day })?;
    Ok(moon_times_on(date, location))
}

/// Walk the day in two-hour windows, fitting a parabola to the altitude above
/// the horizon at each window's edges and centre.
///
/// Returns the rise and set hours. Stops as soon as both are known.
fn scan(altitude: impl Fn(f64) -> f64) -> (Option<f64>, Option<f64>) {
    let mut rise: Option<f64> = None;
    let mut set: Option<f64> = None;

    let mut hour = 1.0;
    let mut ym = altitude(hour - 1.0);
    while hour < 25.0 && (rise.is_none() || set.is_none()) {
        let yz = altitude(hour);
        let yp = altitude(hour + 1.0);
        let roots = quad(ym, yz, yp);

        match roots.count {
            1 => {
                if ym < 0.0 {
                    rise = Some(hour + roots.z1);
                } else {
                    set = Some(hour + roots.z1);
                }
            }
            2 => {
                // Both crossings in one window; the extremum tells which comes first
                if roots.ye < 0.0 {
                    rise = Some(hour + roots.z2);
                    set = Some(hour + roots.z1);
                } else {
                    rise = Some(hour + roots.z1);
                    set = Some(hour + roots.z2);
                }
            }
            _ => {}
        }

        ym = yp;
        hour += 2.0;
    }

    (rise, set)
}

/// Moonrise and moonset on `date` at `location`.
pub fn moon_times_on(date: NaiveDate, location: GeoLocation) -> RiseSetResult {
    let utc_offset_hours = (location.longitude() / 15.0).trunc() as i32;
    let mjd = modified_julian_date(date.year(), date.month(), date.day())
        - utc_offset_hours as f64 / 24.0;

    let (sin_lat, cos_lat) = location.latitude().to_radians().sin_cos();
    let (rise, set) =
        scan(|hour| sin_alt(mjd, hour, location.longitude(), cos_lat, sin_lat) - SIN_H0);

    debug!(
        %date,
        latitude = location.latitude(),
        longitude = location.longitude(),
        ?rise,
        ?set,
        "moon rise/set scan finished"
    );

    let midnight = date.and_time(NaiveTime::MIN);
    let at = |hours: f64| midnight + Duration::minutes(hours_to_minutes(hours));

    RiseSetResult {
        date,
        utc_offset_hours,
        moonrise: rise.map(at),
        moonset: set.map(at),
        day_end: midnight + Duration::days(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::Timelike;
    use std::cell::Cell;

    fn hours_of(t: NaiveDateTime) -> f64 {
        t.hour() as f64 + t.minute() as f64 / 60.0
    }

    #[test]
    fn mjd_of_known_dates() {
        assert_eq!(modified_julian_date(2000, 1, 1), 51_544.0);
        assert_eq!(modified_julian_date(1858, 11, 17), 0.0);
        assert_eq!(modified_julian_date(1970, 1, 1), 40_587.0);
        assert_eq!(modified_julian_date(2024, 2, 29), 60_369.0);
    }

    #[test]
    fn mjd_switches_to_julian_calendar() {
        // 1582-10-04 (Julian) is followed by 1582-10-15 (Gregorian)
        assert_eq!(
            modified_julian_date(1582, 10, 15) - modified_julian_date(1582, 10, 4),
            1.0
        );
    }

    #[test]
    fn minutes_round_to_nearest() {
        assert_eq!(hours_to_minutes(6.5), 390);
        assert_eq!(hours_to_minutes(6.0 + 29.6 / 60.0), 390);
        assert_eq!(hours_to_minutes(6.0 + 29.4 / 60.0), 389);
    }

    #[test]
    fn equator_new_moon_rises_before_it_sets() {
        // New moon 2024-01-11 11:57 UTC: the Moon keeps roughly solar hours
        let equator = GeoLocation::new(0.0, 0.0).unwrap();
        let times = moon_times(2024, 1, 11, equator).unwrap();
        let rise = times.require_moonrise().unwrap();
        let set = times.require_moonset().unwrap();
        assert!(rise < set, "rise {rise} set {set}");
        assert!((4.0..8.0).contains(&hours_of(rise)), "rise {rise}");
        assert!((16.0..20.0).contains(&hours_of(set)), "set {set}");
    }

    #[test]
    fn equator_full_moon_sets_in_the_morning() {
        // Full moon 2024-01-25 17:54 UTC
        let equator = GeoLocation::new(0.0, 0.0).unwrap();
        let times = moon_times(2024, 1, 25, equator).unwrap();
        let rise = times.require_moonrise().unwrap();
        let set = times.require_moonset().unwrap();
        assert!(set < rise);
        assert!((3.0..9.0).contains(&hours_of(set)), "set {set}");
        assert!((15.0..21.0).contains(&hours_of(rise)), "rise {rise}");
    }

    #[test]
    fn offset_follows_longitude() {
        let tokyo = GeoLocation::new(35.68, 139.77).unwrap();
        let times = moon_times(2024, 3, 1, tokyo).unwrap();
        assert_eq!(times.utc_offset_hours, 9);

        let west = GeoLocation::new(40.0, -74.0).unwrap();
        assert_eq!(moon_times(2024, 3, 1, west).unwrap().utc_offset_hours, -4);
    }

    #[test]
    fn utc_conversion_removes_offset() {
        let tokyo = GeoLocation::new(35.68, 139.77).unwrap();
        let times = moon_times(2024, 3, 1, tokyo).unwrap();
        assert!(times.rise_occurred() || times.set_occurred());
        if let (Some(local), Some(utc)) = (times.moonrise, times.moonrise_utc()) {
            assert_eq!(local - utc.naive_utc(), Duration::hours(9));
        }
        if let (Some(local), Some(utc)) = (times.moonset, times.moonset_utc()) {
            assert_eq!(local - utc.naive_utc(), Duration::hours(9));
        }
    }

    #[test]
    fn missing_event_uses_next_midnight() {
        let result = RiseSetResult {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            utc_offset_hours: 0,
            moonrise: None,
            moonset: None,
            day_end: NaiveDate::from_ymd_opt(2024, 6, 2)
                .unwrap()
                .and_time(NaiveTime::MIN),
        };
        assert!(!result.rise_occurred());
        assert_eq!(result.moonrise_or_sentinel(), result.day_end);
        assert_eq!(result.moonset_or_sentinel(), result.day_end);
        assert!(matches!(
            result.require_moonset(),
            Err(MoonError::NoObservableEvent { event: "set", .. })
        ));
        assert_eq!(result.moonrise_timestamp(), None);
    }

    #[test]
    fn high_latitude_days_can_lack_events() {
        // At 80° N the Moon stays circumpolar, or below the horizon, for days at a time
        let north = GeoLocation::new(80.0, 15.0).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let missing = (0..30)
            .map(|d| moon_times_on(start + Duration::days(d), north))
            .filter(|r| !r.rise_occurred() || !r.set_occurred())
            .count();
        assert!(missing > 0);
    }

    #[test]
    fn invalid_date_is_rejected() {
        let loc = GeoLocation::new(0.0, 0.0).unwrap();
        assert_eq!(
            moon_times(2023, 2, 29, loc),
            Err(MoonError::InvalidDate {
                year: 2023,
                month: 2,
                day: 29
            })
        );
    }
    #[test]
    fn dip_below_horizon_within_one_window() {
        // Above the horizon except between 04:30 and 05:30
        let calls = Cell::new(0);
        let (rise, set) = scan(|h| {
            calls.set(calls.get() + 1);
            (h - 5.0).powi(2) - 0.25
        });
        assert_abs_diff_eq!(set.unwrap(), 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(rise.unwrap(), 5.5, epsilon = 1e-9);
        // Windows centred on 01, 03 and 05, then the scan stops
        assert_eq!(calls.get(), 7);
    }

    #[test]
    fn brief_appearance_within_one_window() {
        let (rise, set) = scan(|h| 0.25 - (h - 5.0).powi(2));
        assert_abs_diff_eq!(rise.unwrap(), 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(set.unwrap(), 5.5, epsilon = 1e-9);
    }

    #[test]
    fn scan_covers_whole_day_without_crossings() {
        let calls = Cell::new(0);
        let (rise, set) = scan(|_| {
            calls.set(calls.get() + 1);
            -1.0
        });
        assert_eq!((rise, set), (None, None));
        // Twelve windows from 00:00 to 24:00
        assert_eq!(calls.get(), 25);
    }
}
