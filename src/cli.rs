//! Command-line interface parsing for ecweather
//!
//! This module handles parsing of CLI arguments using clap. Station, province
//! and datamart URL can also come from the environment, and every subcommand
//! falls back to the default station when nothing is given.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::locator::DATAMART_BASE_URL;
use crate::data::DEFAULT_STATION;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Province codes are two ASCII letters
    #[error("Invalid province: '{0}'. Expected a two-letter code such as AB or BC")]
    InvalidProvince(String),

    /// Station codes are non-empty and alphanumeric
    #[error("Invalid station code: '{0}'. Expected a site code such as s0000403")]
    InvalidStation(String),

    /// The time zone is not in the IANA database
    #[error("Invalid time zone: '{0}'. Expected an IANA name such as America/Edmonton")]
    InvalidTimeZone(String),

    /// The date is not in YYYY-MM-DD form
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// ecweather - Environment Canada city weather and sun times
#[derive(Parser, Debug)]
#[command(name = "ecweather")]
#[command(about = "Environment Canada city weather bulletins and sunrise/sunset times")]
#[command(version)]
pub struct Cli {
    /// Citypage station code
    #[arg(
        long,
        global = true,
        env = "ECWEATHER_STATION",
        default_value = DEFAULT_STATION.code,
        value_parser = parse_station_code
    )]
    pub station: String,

    /// Two-letter province code of the station
    #[arg(
        long,
        global = true,
        env = "ECWEATHER_PROVINCE",
        default_value = DEFAULT_STATION.province,
        value_parser = parse_province
    )]
    pub province: String,

    /// Base URL of the citypage weather tree
    #[arg(long, global = true, env = "ECWEATHER_BASE_URL", default_value = DATAMART_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to do
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the station's latest bulletin once (the default)
    Current {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize a bulletin file saved locally
    Parse {
        /// Path to the bulletin XML
        file: PathBuf,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute sunrise and sunset
    ///
    /// Examples:
    ///   ecweather sun                          # Canmore, today
    ///   ecweather sun --date 2025-06-21
    ///   ecweather sun --lat 49.28 --lng -123.12 --tz America/Vancouver
    Sun {
        /// Latitude in degrees, north positive
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_STATION.latitude)]
        lat: f64,

        /// Longitude in degrees, east positive
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_STATION.longitude)]
        lng: f64,

        /// Day of interest (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// IANA time zone the day and the printed times refer to
        #[arg(long, default_value = DEFAULT_STATION.time_zone, value_parser = parse_time_zone)]
        tz: Tz,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep refreshing the snapshot until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,

        /// Print each snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// The subcommand to run, defaulting to a single text fetch
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Current { json: false })
    }
}

impl Command {
    /// Refresh interval for `watch`
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Command::Watch { interval_secs, .. } => Some(Duration::from_secs((*interval_secs).max(1))),
            _ => None,
        }
    }
}

/// Parses a two-letter province code, upper-casing it
pub fn parse_province(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(CliError::InvalidProvince(s.to_string()))
    }
}

/// Parses a citypage station code
pub fn parse_station_code(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(trimmed.to_string())
    } else {
        Err(CliError::InvalidStation(s.to_string()))
    }
}

/// Parses an IANA time zone name
pub fn parse_time_zone(s: &str) -> Result<Tz, CliError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| CliError::InvalidTimeZone(s.to_string()))
}

/// Parses a YYYY-MM-DD date
pub fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Local noon of `date` in `tz`, or now when no date was given
pub fn sun_instant(date: Option<NaiveDate>, tz: Tz) -> DateTime<Utc> {
    let Some(date) = date else {
        return Utc::now();
    };
    let Some(noon) = date.and_hms_opt(12, 0, 0) else {
        return Utc::now();
    };
    tz.from_local_datetime(&noon)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&noon))
}
