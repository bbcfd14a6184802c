//! # Moon Report Rendering
//!
//! This module turns engine output into something a person (or a script) can
//! read. A [`MoonReport`] gathers the snapshot, the quarter phases and the
//! rise/set times; it renders either as an ASCII panel for the terminal or as
//! JSON.

use crate::config::Config;
use crate::error::MoonError;
use crate::moon::Moon;
use crate::phase_hunt::PhaseQuarter;
use crate::rise_set::RiseSetResult;
use crate::{GeoLocation, MoonSnapshot};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Width of the illumination gauge in characters
const GAUGE_WIDTH: usize = 40;

/// One quarter phase in a report
#[derive(Debug, Clone, Serialize)]
pub struct QuarterEntry {
    pub quarter: PhaseQuarter,
    pub at: DateTime<Utc>,
}

/// Everything the tracker prints for one instant and location
#[derive(Debug, Clone, Serialize)]
pub struct MoonReport {
    pub observer: String,
    pub location: GeoLocation,
    pub phase_name: &'static str,
    pub snapshot: MoonSnapshot,
    pub quarters: Vec<QuarterEntry>,
    pub rise_set: RiseSetResult,
}

impl MoonReport {
    /// Run every query for `moon` at `location`.
    pub fn build(moon: &Moon, observer: &str, location: GeoLocation) -> Result<Self, MoonError> {
        let quarters = PhaseQuarter::ALL
            .into_iter()
            .map(|quarter| {
                Ok(QuarterEntry {
                    quarter,
                    at: moon.quarter(quarter)?,
                })
            })
            .collect::<Result<Vec<_>, MoonError>>()?;

        Ok(MoonReport {
            observer: observer.to_string(),
            location,
            phase_name: moon.phase_name(),
            snapshot: *moon.snapshot(),
            quarters,
            rise_set: moon.moon_times(location),
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Illumination as a bar, `#` lit and `.` dark.
fn illumination_gauge(illumination: f64) -> String {
    let lit = (illumination.clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(lit), ".".repeat(GAUGE_WIDTH - lit))
}

/// Format a rise/set instant, or say it does not happen.
fn format_event(
    event: Option<NaiveDateTime>,
    sentinel: NaiveDateTime,
    config: &Config,
) -> String {
    let fmt = config.display.time_format.as_str();
    match event {
        Some(t) => t.format(fmt).to_string(),
        None if config.display.legacy_sentinels => sentinel.format(fmt).to_string(),
        None => "none".to_string(),
    }
}

/// Render a report as a plain-text panel.
pub fn draw_ascii(report: &MoonReport, config: &Config) -> String {
    let fmt = config.display.time_format.as_str();
    let snap = &report.snapshot;
    let mut out = String::new();

    out.push_str(&format!("Moon at {}\n", snap.timestamp.format(fmt)));
    out.push_str(&format!(
        "  {} ({:.1}% illuminated)\n",
        report.phase_name,
        snap.illumination * 100.0
    ));
    out.push_str(&format!("  {}\n\n", illumination_gauge(snap.illumination)));

    out.push_str(&format!("  Phase          {:.4}\n", snap.phase));
    out.push_str(&format!("  Age            {:.2} days\n", snap.age));
    out.push_str(&format!("  Distance       {:.0} km\n", snap.distance));
    out.push_str(&format!("  Diameter       {:.4}°\n", snap.diameter));
    out.push_str(&format!("  Sun distance   {:.0} km\n", snap.sun_distance));
    out.push_str(&format!("  Sun diameter   {:.4}°\n\n", snap.sun_diameter));

    out.push_str("Quarters (UTC)\n");
    for entry in &report.quarters {
        out.push_str(&format!(
            "  {:<20} {}\n",
            entry.quarter.name(),
            entry.at.format(fmt)
        ));
    }

    let rs = &report.rise_set;
    out.push_str(&format!(
        "\n{} ({:.2}, {:.2}), UTC{:+}\n",
        report.observer, report.location.latitude(), report.location.longitude(), rs.utc_offset_hours
    ));
    out.push_str(&format!(
        "  Moonrise       {}\n",
        format_event(rs.moonrise, rs.day_end, config)
    ));
    out.push_str(&format!(
        "  Moonset        {}\n",
        format_event(rs.moonset, rs.day_end, config)
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn sample_report() -> MoonReport {
        let at = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();
        let moon = Moon::new(at).unwrap();
        MoonReport::build(&moon, "Equator", GeoLocation::new(0.0, 0.0).unwrap()).unwrap()
    }

    #[test]
    fn gauge_has_fixed_width() {
        assert_eq!(illumination_gauge(0.0).len(), GAUGE_WIDTH + 2);
        assert_eq!(illumination_gauge(1.0), format!("[{}]", "#".repeat(GAUGE_WIDTH)));
        assert_eq!(illumination_gauge(0.5).matches('#').count(), GAUGE_WIDTH / 2);
    }

    #[test]
    fn report_lists_all_quarters_in_order() {
        let report = sample_report();
        assert_eq!(report.quarters.len(), 8);
        for pair in report.quarters.windows(2) {
            assert!(pair[0].at < pair[1].at);
        }
    }

    #[test]
    fn ascii_panel_mentions_everything() {
        let report = sample_report();
        let text = draw_ascii(&report, &Config::default());
        assert!(text.contains(report.phase_name));
        assert!(text.contains("next_last_quarter"));
        assert!(text.contains("Moonrise"));
        assert!(text.contains("Equator (0.00, 0.00), UTC+0"));
    }

    #[test]
    fn missing_events_follow_sentinel_setting() {
        let day_end = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut config = Config::default();
        assert_eq!(format_event(None, day_end, &config), "none");
        config.display.legacy_sentinels = true;
        assert_eq!(format_event(None, day_end, &config), "2024-06-02 00:00:00");
    }

    #[test]
    fn json_contains_snapshot_fields() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["snapshot"]["phase"].is_f64());
        assert_eq!(value["quarters"][2]["quarter"], "full_moon");
        assert!(value["rise_set"]["utc_offset_hours"].is_i64());
    }
}
