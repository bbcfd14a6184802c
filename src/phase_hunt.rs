//! # Phase Quarter Search
//!
//! Locates the new moons bracketing an instant and the quarter phases of the
//! two lunations they start.
//!
//! ## Algorithm
//! 1. Seed a lunation index `k` from the calendar month 45 days before the
//!    instant: `k = floor((year + (month - 1) / 12 - 1900) × 12.3685)`.
//! 2. Step `k` forward one lunation at a time using the mean-phase
//!    polynomial, switching to the corrected true phase once the estimate
//!    lands within 0.75 days of the instant.
//! 3. Stop when `mean(k1) ≤ instant < mean(k2)`.
//! 4. Refine the four quarters of `k1` and `k2` with the periodic series.
//!
//! [`phase_hunt`] is pure; the [`Moon`](crate::moon::Moon) engine memoizes it.

use crate::error::MoonError;
use crate::lunar::{julian_to_unix, unix_to_julian, SYNODIC_MONTH};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Julian date of 1900 January 0.5, the epoch of the phase series
const EPOCH_1900: f64 = 2_415_020.0;

/// Lunations per Julian century
const LUNATIONS_PER_CENTURY: f64 = 1236.85;

/// Lunations stepped before the bracketing search gives up
const MAX_LUNATIONS: usize = 64;

/// Days of lead time used to seed the lunation index
const SEED_LEAD_DAYS: i64 = 45;

/// One of the eight named quarter boundaries around an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseQuarter {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
    NextNewMoon,
    NextFirstQuarter,
    NextFullMoon,
    NextLastQuarter,
}

impl PhaseQuarter {
    /// All quarters in chronological order.
    pub const ALL: [PhaseQuarter; 8] = [
        PhaseQuarter::NewMoon,
        PhaseQuarter::FirstQuarter,
        PhaseQuarter::FullMoon,
        PhaseQuarter::LastQuarter,
        PhaseQuarter::NextNewMoon,
        PhaseQuarter::NextFirstQuarter,
        PhaseQuarter::NextFullMoon,
        PhaseQuarter::NextLastQuarter,
    ];

    /// Position within a [`PhaseQuarterSet`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// snake_case name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            PhaseQuarter::NewMoon => "new_moon",
            PhaseQuarter::FirstQuarter => "first_quarter",
            PhaseQuarter::FullMoon => "full_moon",
            PhaseQuarter::LastQuarter => "last_quarter",
            PhaseQuarter::NextNewMoon => "next_new_moon",
            PhaseQuarter::NextFirstQuarter => "next_first_quarter",
            PhaseQuarter::NextFullMoon => "next_full_moon",
            PhaseQuarter::NextLastQuarter => "next_last_quarter",
        }
    }

    /// Quarter of the lunation this boundary belongs to.
    pub fn kind(self) -> QuarterKind {
        match self.index() % 4 {
            0 => QuarterKind::New,
            1 => QuarterKind::First,
            2 => QuarterKind::Full,
            _ => QuarterKind::Last,
        }
    }
}

impl fmt::Display for PhaseQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseQuarter {
    type Err = MoonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseQuarter::ALL
            .into_iter()
            .find(|q| q.name() == s)
            .ok_or_else(|| MoonError::UnknownQuarterName(s.to_string()))
    }
}

/// Quarter selector for the true-phase correction series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuarterKind {
    New,
    First,
    Full,
    Last,
}

impl QuarterKind {
    /// Fraction of a lunation past new moon.
    pub fn selector(self) -> f64 {
        match self {
            QuarterKind::New => 0.0,
            QuarterKind::First => 0.25,
            QuarterKind::Full => 0.5,
            QuarterKind::Last => 0.75,
        }
    }
}

const KINDS: [QuarterKind; 4] = [
    QuarterKind::New,
    QuarterKind::First,
    QuarterKind::Full,
    QuarterKind::Last,
];

/// The eight quarter boundaries surrounding an instant, in Unix seconds.
///
/// Ordered new, first, full, last of the lunation containing the instant,
/// then the same four of the next lunation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseQuarterSet {
    timestamps: [f64; 8],
}

impl PhaseQuarterSet {
    /// Unix seconds of one quarter.
    pub fn get(&self, quarter: PhaseQuarter) -> f64 {
        self.timestamps[quarter.index()]
    }

    /// One quarter as a UTC instant, truncated to the whole second.
    pub fn datetime(&self, quarter: PhaseQuarter) -> Result<DateTime<Utc>, MoonError> {
        let secs = self.get(quarter).floor() as i64;
        DateTime::from_timestamp(secs, 0).ok_or(MoonError::InvalidTimestamp(secs))
    }

    /// All eight timestamps in chronological order.
    pub fn timestamps(&self) -> &[f64; 8] {
        &self.timestamps
    }

    /// `(quarter, unix seconds)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (PhaseQuarter, f64)> + '_ {
        PhaseQuarter::ALL.into_iter().zip(self.timestamps.iter().copied())
    }
}

/// Mean time of new moon number `k`, as a Julian date.
///
/// `date` is the approximate Julian date of that lunation; only the slow
/// secular terms depend on it.
pub fn meanphase(date: f64, k: f64) -> f64 {
    let t = (date - EPOCH_1900) / 36_525.0;
    let t2 = t * t;
    let t3 = t2 * t;

    2_415_020.759_33 + SYNODIC_MONTH * k + 0.000_117_8 * t2 - 0.000_000_155 * t3
        + 0.000_33 * sind(166.56 + 132.87 * t - 0.009_173 * t2)
}

/// Corrected time of a quarter of lunation `k`, as a Julian date.
pub fn truephase(k: f64, kind: QuarterKind) -> f64 {
    let k = k + kind.selector();
    let t = k / LUNATIONS_PER_CENTURY;
    let t2 = t * t;
    let t3 = t2 * t;

    let mut pt = 2_415_020.759_33 + SYNODIC_MONTH * k + 0.000_117_8 * t2 - 0.000_000_155 * t3
        + 0.000_33 * sind(166.56 + 132.87 * t - 0.009_173 * t2);

    // Sun's mean anomaly, Moon's mean anomaly, Moon's argument of latitude
    let m = 359.2242 + 29.105_356_08 * k - 0.000_033_3 * t2 - 0.000_003_47 * t3;
    let mp = 306.0253 + 385.816_918_06 * k + 0.010_730_6 * t2 + 0.000_012_36 * t3;
    let f = 21.2964 + 390.670_506_46 * k - 0.001_652_8 * t2 - 0.000_002_39 * t3;

    match kind {
        QuarterKind::New | QuarterKind::Full => {
            pt += (0.1734 - 0.000_393 * t) * sind(m) + 0.0021 * sind(2.0 * m)
                - 0.4068 * sind(mp)
                + 0.0161 * sind(2.0 * mp)
                - 0.0004 * sind(3.0 * mp)
                + 0.0104 * sind(2.0 * f)
                - 0.0051 * sind(m + mp)
                - 0.0074 * sind(m - mp)
                + 0.0004 * sind(2.0 * f + m)
                - 0.0004 * sind(2.0 * f - m)
                - 0.0006 * sind(2.0 * f + mp)
                + 0.0010 * sind(2.0 * f - mp)
                + 0.0005 * sind(m + 2.0 * mp);
        }
        QuarterKind::First | QuarterKind::Last => {
            pt += (0.1721 - 0.0004 * t) * sind(m) + 0.0021 * sind(2.0 * m)
                - 0.6280 * sind(mp)
                + 0.0089 * sind(2.0 * mp)
                - 0.0004 * sind(3.0 * mp)
                + 0.0079 * sind(2.0 * f)
                - 0.0119 * sind(m + mp)
                - 0.0047 * sind(m - mp)
                + 0.0003 * sind(2.0 * f + m)
                - 0.0004 * sind(2.0 * f - m)
                - 0.0006 * sind(2.0 * f + mp)
                + 0.0021 * sind(2.0 * f - mp)
                + 0.0003 * sind(m + 2.0 * mp)
                + 0.0004 * sind(m - 2.0 * mp)
                - 0.0003 * sind(2.0 * m + mp);

            let offset = 0.0028 - 0.0004 * cosd(m) + 0.0003 * cosd(mp);
            pt += if kind == QuarterKind::First {
                offset
            } else {
                -offset
            };
        }
    }

    pt
}

/// Find the quarter boundaries surrounding `at`.
///
/// # Errors
/// [`MoonError::NumericDivergence`] if no bracketing pair of new moons is
/// found within 64 lunations of the seed, which only happens for
/// non-finite input. [`MoonError::InvalidTimestamp`] if `at` is too close to
/// the earliest representable instant to seed the search.
pub fn phase_hunt(at: DateTime<Utc>) -> Result<PhaseQuarterSet, MoonError> {
    let sdate = unix_to_julian(crate::lunar::unix_seconds(&at));

    let seed = at
        .checked_sub_signed(Duration::days(SEED_LEAD_DAYS))
        .ok_or(MoonError::InvalidTimestamp(at.timestamp()))?;
    let year = seed.year() as f64;
    let month = seed.month() as f64;
    let mut k1 = ((year + (month - 1.0) / 12.0 - 1900.0) * 12.3685).floor();

    let mut adate = meanphase(sdate - SEED_LEAD_DAYS as f64, k1);
    let mut nt1 = adate;
    let mut bracket = None;

    for _ in 0..MAX_LUNATIONS {
        adate += SYNODIC_MONTH;
        let k2 = k1 + 1.0;
        let mut nt2 = meanphase(adate, k2);

        // The mean estimate is too coarse this close to the instant
        if (nt2 - sdate).abs() < 0.75 {
            nt2 = truephase(k2, QuarterKind::New);
        }

        if nt1 <= sdate && nt2 > sdate {
            bracket = Some((k1, k2));
            break;
        }

        nt1 = nt2;
        k1 = k2;
    }

    let Some((k1, k2)) = bracket else {
        warn!(julian_date = sdate, "phase hunt failed to bracket the instant");
        return Err(MoonError::NumericDivergence {
            routine: "phase hunt",
            iterations: MAX_LUNATIONS,
        });
    };
    debug!(k1, k2, julian_date = sdate, "bracketed lunation");

    let mut timestamps = [0.0; 8];
    for (lunation, k) in [k1, k2].into_iter().enumerate() {
        for (quarter, kind) in KINDS.into_iter().enumerate() {
            timestamps[lunation * 4 + quarter] = julian_to_unix(truephase(k, kind));
        }
    }

    Ok(PhaseQuarterSet { timestamps })
}

#[inline]
fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

#[inline]
fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn assert_near(actual: f64, expected: DateTime<Utc>, tolerance_mins: f64) {
        let diff = (actual - expected.timestamp() as f64).abs() / 60.0;
        assert!(
            diff < tolerance_mins,
            "{} is {diff:.1} minutes from {expected}",
            DateTime::from_timestamp(actual as i64, 0).unwrap()
        );
    }

    #[test]
    fn quarter_names_round_trip() {
        for q in PhaseQuarter::ALL {
            assert_eq!(q.name().parse::<PhaseQuarter>().unwrap(), q);
            assert_eq!(q.to_string(), q.name());
        }
    }

    #[test]
    fn unknown_quarter_name_is_rejected() {
        assert_eq!(
            "blue_moon".parse::<PhaseQuarter>(),
            Err(MoonError::UnknownQuarterName("blue_moon".into()))
        );
    }

    #[test]
    fn quarter_kinds_cycle() {
        assert_eq!(PhaseQuarter::NewMoon.kind(), QuarterKind::New);
        assert_eq!(PhaseQuarter::NextFullMoon.kind(), QuarterKind::Full);
        assert_eq!(PhaseQuarter::NextLastQuarter.kind(), QuarterKind::Last);
    }

    #[test]
    fn finds_january_2024_lunation() {
        let set = phase_hunt(utc(2024, 1, 20, 12, 0)).unwrap();
        assert_near(set.get(PhaseQuarter::NewMoon), utc(2024, 1, 11, 11, 57), 30.0);
        assert_near(set.get(PhaseQuarter::FirstQuarter), utc(2024, 1, 18, 3, 53), 30.0);
        assert_near(set.get(PhaseQuarter::FullMoon), utc(2024, 1, 25, 17, 54), 30.0);
        assert_near(set.get(PhaseQuarter::LastQuarter), utc(2024, 2, 2, 23, 18), 30.0);
        assert_near(set.get(PhaseQuarter::NextNewMoon), utc(2024, 2, 9, 22, 59), 30.0);
        assert_near(set.get(PhaseQuarter::NextFullMoon), utc(2024, 2, 24, 12, 30), 30.0);
    }

    #[test]
    fn brackets_the_instant() {
        let at = utc(1999, 8, 1, 0, 0);
        let set = phase_hunt(at).unwrap();
        let t = at.timestamp() as f64;
        assert!(set.get(PhaseQuarter::NewMoon) <= t + 3600.0);
        assert!(set.get(PhaseQuarter::NextNewMoon) > t - 3600.0);
    }

    #[test]
    fn earliest_instants_are_rejected() {
        let at = DateTime::<Utc>::MIN_UTC;
        assert_eq!(
            phase_hunt(at),
            Err(MoonError::InvalidTimestamp(at.timestamp()))
        );
        let at = DateTime::<Utc>::MIN_UTC + Duration::days(SEED_LEAD_DAYS - 1);
        assert!(phase_hunt(at).is_err());
    }

    #[test]
    fn quarters_are_evenly_spaced() {
        let set = phase_hunt(utc(2010, 3, 14, 6, 0)).unwrap();
        let quarter_secs = SYNODIC_MONTH / 4.0 * 86_400.0;
        for pair in set.timestamps().windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap > 0.0);
            assert!(
                (gap - quarter_secs).abs() < 86_400.0,
                "gap of {:.2} days",
                gap / 86_400.0
            );
        }
    }

    #[test]
    fn new_moon_close_to_instant_is_refined() {
        // Two hours before the 2024-01-11 11:57 UTC new moon
        let set = phase_hunt(utc(2024, 1, 11, 10, 0)).unwrap();
        let target = utc(2024, 1, 11, 11, 57).timestamp() as f64;
        let nearest = [PhaseQuarter::NewMoon, PhaseQuarter::NextNewMoon]
            .into_iter()
            .map(|q| (set.get(q) - target).abs())
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 30.0 * 60.0, "off by {:.0} s", nearest);
    }

    #[test]
    fn datetime_truncates_to_seconds() {
        let set = phase_hunt(utc(2024, 1, 20, 12, 0)).unwrap();
        let dt = set.datetime(PhaseQuarter::FullMoon).unwrap();
        assert_eq!(dt.timestamp(), set.get(PhaseQuarter::FullMoon).floor() as i64);
    }
}
