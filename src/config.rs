//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the moon-config.toml file.
//! It provides a centralized way to configure the observer location and report
//! formatting for the command-line tracker.

use crate::error::MoonError;
use crate::GeoLocation;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "moon-config.toml";

/// Application configuration loaded from moon-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Observer location for moonrise/moonset
    pub observer: ObserverConfig,
    /// Report formatting
    pub display: DisplayConfig,
}

/// Observer location
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObserverConfig {
    /// Human-readable place name for the report header
    pub name: String,
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
}

/// Report formatting options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// chrono strftime pattern for instants in the report
    pub time_format: String,
    /// Print next-day midnight for a missing moonrise/moonset instead of "none"
    pub legacy_sentinels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            observer: ObserverConfig {
                name: "Greenwich".to_string(),
                latitude: 51.4769,
                longitude: 0.0,
            },
            display: DisplayConfig {
                time_format: "%Y-%m-%d %H:%M:%S".to_string(),
                legacy_sentinels: false,
            },
        }
    }
}

impl ObserverConfig {
    /// Validated location of the observer.
    pub fn location(&self) -> Result<GeoLocation, MoonError> {
        GeoLocation::new(self.latitude, self.longitude)
    }
}

impl Config {
    /// Load configuration from moon-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(observer = %config.observer.name, "loaded configuration");
                    config.with_valid_time_format()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Replace a `time_format` chrono cannot render with the default one.
    fn with_valid_time_format(mut self) -> Self {
        let fmt = &self.display.time_format;
        if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
            warn!(time_format = %fmt, "invalid time_format, using default");
            self.display.time_format = Config::default().display.time_format;
        }
        self
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
