//! # Moon Tracker Application Entry Point
//!
//! This binary crate wraps the lunar engine in a small command-line tool. It
//! resolves the instant and the observer from arguments and moon-config.toml,
//! then prints an ASCII report (default) or JSON (`--json`).
//!
//! ```text
//! moon-tracker [--date <RFC 3339 | unix seconds>] [--lat <deg>] [--lon <deg>]
//!              [--json] [--config <path>]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default: warn); logs go to stderr.


use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use std::env;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

// Re-export library types for internal use
pub use moon_tracker_lib::{config::Config, GeoLocation, Moon};
use moon_tracker_lib::renderer::{draw_ascii, MoonReport};

/// Value following `flag` on the command line, if present.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Parse `--date` as RFC 3339 or as Unix seconds.
fn parse_instant(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(seconds) = value.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow!("timestamp {seconds} is out of range"));
    }
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid --date {value:?}, expected RFC 3339 or unix seconds"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Parse a numeric flag, if given.
fn parse_degrees(args: &[String], flag: &str) -> anyhow::Result<Option<f64>> {
    arg_value(args, flag)
        .map(|v| {
            v.parse::<f64>()
                .with_context(|| format!("invalid {flag} {v:?}, expected degrees"))
        })
        .transpose()
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let json_mode = args.iter().any(|arg| arg == "--json");

    let config = match arg_value(&args, "--config") {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    let at = match arg_value(&args, "--date") {
        Some(value) => parse_instant(value)?,
        None => Utc::now(),
    };

    // Command-line coordinates override the configured observer
    let latitude = parse_degrees(&args, "--lat")?.unwrap_or(config.observer.latitude);
    let longitude = parse_degrees(&args, "--lon")?.unwrap_or(config.observer.longitude);
    let location = GeoLocation::new(latitude, longitude)?;
    let observer = if latitude == config.observer.latitude && longitude == config.observer.longitude
    {
        config.observer.name.clone()
    } else {
        "Observer".to_string()
    };
    debug!(%at, latitude, longitude, "computing moon report");

    let moon = Moon::new(at).context("computing lunar ephemeris")?;
    let report = MoonReport::build(&moon, &observer, location).context("building report")?;

    if json_mode {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", draw_ascii(&report, &config));
    }

    Ok(())
}
