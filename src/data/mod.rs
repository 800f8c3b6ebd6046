//! Core data models for the Environment Canada bulletin pipeline
//!
//! This module contains the normalized snapshot types handed to callers, the
//! error type shared by every pipeline stage, and the stage modules that turn
//! a station code into a `WeatherSnapshot`.

pub mod bulletin;
pub mod conditions;
pub mod locator;
pub mod normalize;
pub mod station;
pub mod value;
pub mod weather;

pub use bulletin::Bulletin;
pub use locator::{BulletinLocator, BulletinSource, HttpSource, LocatedBulletin};
pub use normalize::normalize;
pub use station::{Station, DEFAULT_STATION};
pub use weather::WeatherClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while locating, parsing, or normalizing a bulletin
#[derive(Debug, Error)]
pub enum BulletinError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// No bulletin file matched in any of the searched hour buckets
    #[error("No bulletin found for station {station_code} ({province}) after {attempts} attempts")]
    NotFound {
        station_code: String,
        province: String,
        attempts: usize,
    },

    /// The bulletin could not be tokenized as XML
    #[error("Malformed bulletin document: {0}")]
    Malformed(String),

    /// The parsed document lacks a section the normalizer requires
    #[error("Invalid bulletin structure: missing {0}")]
    InvalidStructure(String),

    /// The file name pattern could not be built
    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Normalized weather conditions for a single station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Display label, e.g. "Canmore, AB"
    pub location: String,
    /// Condition text for today
    pub condition: String,
    /// Two-digit icon code for today
    pub icon_code: String,
    /// Current temperature in Celsius
    pub current_temp: i32,
    /// Today's forecast high in Celsius
    pub today_high: i32,
    /// Tonight's forecast low in Celsius
    pub today_low: i32,
    /// Sustained wind speed in km/h
    pub wind_speed: f64,
    /// Wind gust in km/h, never below `wind_speed`
    pub wind_gust: f64,
    /// Wind direction as published, e.g. "NW"
    pub wind_direction: Option<String>,
    /// UV index right now, if reported
    pub uv_index_now: Option<f64>,
    /// Today's peak UV index, if reported
    pub uv_index_today_high: Option<f64>,
    /// Up to seven daytime forecast entries in bulletin order
    pub seven_day_forecast: Vec<DayForecast>,
}

/// A single daytime entry of the multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    /// Period label as published, e.g. "Wednesday"
    pub period: String,
    /// Weekday initial, or the label unchanged for other periods
    pub period_display: String,
    /// Condition text for the period
    pub condition: String,
    /// Two-digit icon code for the period
    pub icon_code: String,
    /// Daytime high in Celsius
    pub high: Option<i32>,
    /// Overnight low in Celsius, taken from the following night period
    pub low: Option<i32>,
    /// Probability of precipitation in percent
    pub pop: Option<f64>,
}
