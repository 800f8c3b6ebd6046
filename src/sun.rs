//! Sunrise and sunset times
//!
//! Implements the NOAA solar position approximation: from the Julian century
//! of the date it derives the sun's declination and the equation of time,
//! then the hour angle at which the sun's centre sits 0.833° below the
//! horizon (refraction plus solar radius).
//!
//! Above the polar circles the hour angle is undefined for part of the year.
//! Those days are reported as `PolarDay` (a 24-hour day starting at UTC
//! midnight) or `PolarNight` (a zero-length day at solar noon) instead of
//! producing invalid instants.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zenith angle of the sun at apparent sunrise/sunset, in degrees
const SUNRISE_ZENITH: f64 = 90.833;

/// Julian day of the J2000.0 epoch
const J2000: f64 = 2_451_545.0;

/// Days per Julian century
const JULIAN_CENTURY: f64 = 36_525.0;

const MINUTES_PER_DAY: f64 = 1_440.0;

/// Minutes of clock time per degree of Earth rotation
const MINUTES_PER_DEGREE: f64 = MINUTES_PER_DAY / 360.0;

/// What kind of day the sun has at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayKind {
    /// The sun rises and sets
    Regular,
    /// The sun stays above the horizon all day
    PolarDay,
    /// The sun stays below the horizon all day
    PolarNight,
}

/// Sunrise, sunset and solar noon for one day at one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
    pub kind: DayKind,
}

impl SunTimes {
    /// Time between sunrise and sunset
    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }

    /// Whether `at` falls between sunrise and sunset
    pub fn is_daytime(&self, at: DateTime<Utc>) -> bool {
        match self.kind {
            DayKind::PolarDay => true,
            DayKind::PolarNight => false,
            DayKind::Regular => at >= self.sunrise && at < self.sunset,
        }
    }
}

/// Computes sunrise and sunset for a location and date
///
/// # Arguments
/// * `lat` - Latitude in degrees, north positive
/// * `lng` - Longitude in degrees, east positive
/// * `date` - Any instant on the day of interest
/// * `time_zone` - When given, the calculation uses the local calendar day of
///   `date` in that zone, anchored at noon, so a caller whose clock runs in a
///   different zone does not land on the neighbouring day
pub fn sun_times(lat: f64, lng: f64, date: DateTime<Utc>, time_zone: Option<Tz>) -> SunTimes {
    let calc_date = match time_zone {
        Some(tz) => local_noon(date, tz),
        None => date,
    };

    let jc = (julian_day(calc_date) - J2000) / JULIAN_CENTURY;

    let geom_mean_long_sun = (280.46646 + jc * (36000.76983 + 0.0003032 * jc)).rem_euclid(360.0);
    let geom_mean_anom_sun = 357.52911 + jc * (35999.05029 - 0.0001537 * jc);
    let eccent_earth_orbit = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

    let m = geom_mean_anom_sun.to_radians();
    let sun_eq_of_ctr = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289;

    let sun_true_long = geom_mean_long_sun + sun_eq_of_ctr;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let sun_app_long = sun_true_long - 0.00569 - 0.00478 * omega.sin();

    let mean_obliq_ecliptic =
        23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliq_corr = mean_obliq_ecliptic + 0.00256 * omega.cos();

    let sun_declin = (obliq_corr.to_radians().sin() * sun_app_long.to_radians().sin()).asin();

    let y = (obliq_corr.to_radians() / 2.0).tan().powi(2);
    let l0 = geom_mean_long_sun.to_radians();
    let e = eccent_earth_orbit;
    let eq_of_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * e * m.sin() + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * e * e * (2.0 * m).sin())
        .to_degrees();

    let lat_rad = lat.to_radians();
    let cos_hour_angle = SUNRISE_ZENITH.to_radians().cos() / (lat_rad.cos() * sun_declin.cos())
        - lat_rad.tan() * sun_declin.tan();

    let solar_noon_minutes = MINUTES_PER_DAY / 2.0 - MINUTES_PER_DEGREE * lng - eq_of_time;
    let day_start = utc_midnight(calc_date);
    let solar_noon = offset_minutes(day_start, solar_noon_minutes);

    if cos_hour_angle > 1.0 {
        return SunTimes {
            sunrise: solar_noon,
            sunset: solar_noon,
            solar_noon,
            kind: DayKind::PolarNight,
        };
    }
    if cos_hour_angle < -1.0 || cos_hour_angle.is_nan() {
        return SunTimes {
            sunrise: day_start,
            sunset: day_start + Duration::days(1),
            solar_noon,
            kind: DayKind::PolarDay,
        };
    }

    let hour_angle = cos_hour_angle.acos().to_degrees();
    SunTimes {
        sunrise: offset_minutes(day_start, solar_noon_minutes - hour_angle * MINUTES_PER_DEGREE),
        sunset: offset_minutes(day_start, solar_noon_minutes + hour_angle * MINUTES_PER_DEGREE),
        solar_noon,
        kind: DayKind::Regular,
    }
}

/// Julian day number of an instant, including the fraction of the day in hours
fn julian_day(date: DateTime<Utc>) -> f64 {
    let year = i64::from(date.year());
    let month = i64::from(date.month());
    let a = (14 - month) / 12;
    let yy = year + 4800 - a;
    let mm = month + 12 * a - 3;

    let day = f64::from(date.day()) + f64::from(date.hour()) / 24.0;
    let days = (153 * mm + 2) / 5 + 365 * yy + yy.div_euclid(4) - yy.div_euclid(100)
        + yy.div_euclid(400)
        - 32045;
    day + days as f64
}

/// Noon UTC on the calendar day that `date` falls on in `tz`
fn local_noon(date: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local_day = date.with_timezone(&tz).date_naive();
    at_utc(local_day, 12)
}

fn utc_midnight(date: DateTime<Utc>) -> DateTime<Utc> {
    at_utc(date.date_naive(), 0)
}

fn at_utc(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    let naive = day.and_hms_opt(hour, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&naive)
}

fn offset_minutes(start: DateTime<Utc>, minutes: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANMORE_LAT: f64 = 51.09;
    const CANMORE_LNG: f64 = -115.36;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn edmonton() -> Tz {
        "America/Edmonton".parse().unwrap()
    }

    #[test]
    fn test_summer_solstice_is_long() {
        let times = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 6, 21), None);

        assert_eq!(times.kind, DayKind::Regular);
        assert!(times.sunrise < times.solar_noon);
        assert!(times.solar_noon < times.sunset);
        assert!(times.day_length() > Duration::hours(15));
        assert!(times.day_length() < Duration::hours(17));
    }

    #[test]
    fn test_winter_solstice_is_short() {
        let times = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 12, 21), None);

        assert_eq!(times.kind, DayKind::Regular);
        assert!(times.day_length() < Duration::hours(9));
        assert!(times.day_length() > Duration::hours(7));
    }

    #[test]
    fn test_solar_noon_near_expected_clock_time() {
        // Canmore solar noon in mid-June is close to 19:43 UTC
        let times = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 6, 21), None);
        let expected = Utc.with_ymd_and_hms(2025, 6, 21, 19, 43, 0).unwrap();
        assert!((times.solar_noon - expected).num_minutes().abs() <= 5);
    }

    #[test]
    fn test_sunrise_matches_published_time() {
        // Canmore sunrise on 2025-06-21 is about 05:29 MDT (11:29 UTC)
        let times = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 6, 21), Some(edmonton()));
        let expected = Utc.with_ymd_and_hms(2025, 6, 21, 11, 29, 0).unwrap();
        assert!((times.sunrise - expected).num_minutes().abs() <= 10);
    }

    #[test]
    fn test_time_zone_reanchors_to_local_day() {
        // 03:00 UTC on the 22nd is still the evening of the 21st in Edmonton
        let late_evening = Utc.with_ymd_and_hms(2025, 6, 22, 3, 0, 0).unwrap();
        let anchored = sun_times(CANMORE_LAT, CANMORE_LNG, late_evening, Some(edmonton()));
        let local_day = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 6, 21), None);

        assert_eq!(anchored, local_day);
    }

    #[test]
    fn test_sun_times_is_deterministic() {
        let a = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 3, 20), None);
        let b = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 3, 20), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equinox_day_is_about_twelve_hours() {
        let times = sun_times(0.0, 0.0, noon(2025, 3, 20), None);
        let minutes = times.day_length().num_minutes();
        assert!((715..=735).contains(&minutes), "day length was {minutes} min");
    }

    #[test]
    fn test_polar_day_and_night() {
        let summer = sun_times(78.22, 15.65, noon(2025, 6, 21), None);
        assert_eq!(summer.kind, DayKind::PolarDay);
        assert_eq!(summer.day_length(), Duration::days(1));
        assert!(summer.is_daytime(noon(2025, 6, 21)));

        let winter = sun_times(78.22, 15.65, noon(2025, 12, 21), None);
        assert_eq!(winter.kind, DayKind::PolarNight);
        assert_eq!(winter.day_length(), Duration::zero());
        assert!(!winter.is_daytime(noon(2025, 12, 21)));
    }

    #[test]
    fn test_is_daytime() {
        let times = sun_times(CANMORE_LAT, CANMORE_LNG, noon(2025, 6, 21), None);

        assert!(times.is_daytime(times.solar_noon));
        assert!(!times.is_daytime(times.sunrise - Duration::minutes(1)));
        assert!(!times.is_daytime(times.sunset));
    }

    #[test]
    fn test_julian_day_counts_days_and_hours() {
        let midnight = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert!((julian_day(midnight) - J2000).abs() < 1e-9);
        assert!((julian_day(noon(2000, 1, 1)) - julian_day(midnight) - 0.5).abs() < 1e-9);
        assert!((julian_day(noon(2000, 3, 1)) - julian_day(noon(2000, 2, 28)) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_solar_noon_shifts_four_minutes_per_degree() {
        let greenwich = sun_times(51.48, 0.0, noon(2025, 3, 20), None);
        let offset = greenwich.solar_noon - Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        assert!(offset.num_minutes().abs() <= 17, "offset was {offset}");

        let fifteen_west = sun_times(51.48, -15.0, noon(2025, 3, 20), None);
        let shift = fifteen_west.solar_noon - greenwich.solar_noon;
        assert!((shift.num_seconds() - 3_600).abs() <= 5, "shift was {shift}");
    }
}
