//! Static station data
//!
//! Holds the station the tool reports on when none is given on the command
//! line. Looking stations up by coordinates is left to callers.

use serde::Serialize;

/// A citypage weather station and where it sits
///
/// Uses `&'static str` for string fields to allow static initialization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Station {
    /// Citypage site code, e.g. "s0000403"
    pub code: &'static str,
    /// Two-letter province code used in the bulletin directory layout
    pub province: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// IANA time zone of the station
    pub time_zone: &'static str,
}

/// Canmore, Alberta
pub static DEFAULT_STATION: Station = Station {
    code: "s0000403",
    province: "AB",
    name: "Canmore",
    latitude: 51.09,
    longitude: -115.36,
    time_zone: "America/Edmonton",
};
