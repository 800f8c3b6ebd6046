//! Bulletin normalization
//!
//! Reduces a parsed citypage bulletin to a `WeatherSnapshot`: current
//! conditions, today's high and low, and up to seven daytime forecast
//! entries. Night lows are published under the night period that follows a
//! day, so the forecast pass looks one period ahead.

use super::bulletin::Bulletin;
use super::conditions::{icon_description, pad_icon_code, PLACEHOLDER_CONDITION};
use super::value::{as_sequence, extract_text, parse_number, Node};
use super::{BulletinError, DayForecast, WeatherSnapshot};

/// Root section every citypage bulletin carries
const ROOT_SECTION: &str = "siteData";

/// Wind gust value meaning "no gust reported"
const GUST_SENTINEL: &str = "00";

/// Maximum number of entries in the multi-day forecast
const MAX_FORECAST_DAYS: usize = 7;

/// Icon code used for today when the bulletin gives none
const DEFAULT_TODAY_ICON: &str = "02";

/// Icon code used for a forecast day when the bulletin gives none
const DEFAULT_DAY_ICON: &str = "00";

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Normalizes a parsed bulletin into a snapshot
///
/// # Arguments
/// * `bulletin` - The parsed bulletin document
/// * `province` - Caller-supplied province, used when the bulletin lacks one
///
/// # Returns
/// * `Ok(WeatherSnapshot)` - Missing optional readings come back as `None`
/// * `Err(BulletinError::InvalidStructure)` - If the root section is absent
pub fn normalize(bulletin: &Bulletin, province: &str) -> Result<WeatherSnapshot, BulletinError> {
    let site = bulletin
        .section(ROOT_SECTION)
        .ok_or_else(|| BulletinError::InvalidStructure(ROOT_SECTION.to_string()))?;

    let location = location_label(site.child("location"), province);

    let current = site.child("currentConditions");
    let current_temp = current
        .and_then(|c| parse_number(&extract_text(c.child("temperature"))))
        .map(round_temp)
        .unwrap_or(0);
    let current_condition = extract_text(current.and_then(|c| c.child("condition")));
    let wind = current.and_then(|c| c.child("wind"));
    let wind_speed = parse_number(&extract_text(wind.and_then(|w| w.child("speed")))).unwrap_or(0.0);
    let wind_gust = effective_gust(wind_speed, &extract_text(wind.and_then(|w| w.child("gust"))));
    let wind_direction = Some(extract_text(wind.and_then(|w| w.child("direction"))))
        .filter(|d| !d.is_empty());

    let periods = as_sequence(site.path(&["forecastGroup", "forecast"]));

    let mut today: Option<TodayReadings> = None;
    let mut today_low: Option<i32> = None;
    let mut forecast: Vec<DayForecast> = Vec::new();

    for (i, period) in periods.iter().enumerate() {
        let name = period_name(period);

        // The observed condition only stands in for today's summary
        let observed = (name == "Today").then_some(current_condition.as_str());

        if name == "Today" {
            today = Some(TodayReadings {
                high: temperature_reading(period, "high").unwrap_or(current_temp),
                uv_index: uv_index(period),
                icon_code: icon_code(period).unwrap_or_else(|| DEFAULT_TODAY_ICON.to_string()),
                condition: condition_text(period, observed),
            });
        }
        if name == "Tonight" {
            today_low = Some(temperature_reading(period, "low").unwrap_or(current_temp));
        }

        // Today is also the first entry of the multi-day row
        if is_day_period(&name) && forecast.len() < MAX_FORECAST_DAYS {
            // The overnight low for a day is published on the next period
            let low = periods
                .get(i + 1)
                .and_then(|next| temperature_reading(next, "low"));

            forecast.push(DayForecast {
                period_display: period_display(&name),
                condition: condition_text(period, observed),
                icon_code: icon_code(period).unwrap_or_else(|| DEFAULT_DAY_ICON.to_string()),
                high: temperature_reading(period, "high"),
                low,
                pop: parse_number(&extract_text(period.path(&["abbreviatedForecast", "pop"]))),
                period: name,
            });
        }
    }

    // Bulletins issued late in the day start at "Tonight"; borrow from the first day
    let today = today.unwrap_or_else(|| TodayReadings::from_first_day(forecast.first(), current_temp));

    Ok(WeatherSnapshot {
        location,
        condition: today.condition,
        icon_code: today.icon_code,
        current_temp,
        today_high: today.high,
        today_low: today_low.unwrap_or(0),
        wind_speed,
        wind_gust,
        wind_direction,
        uv_index_now: today.uv_index,
        uv_index_today_high: today.uv_index,
        seven_day_forecast: forecast,
    })
}

/// Readings taken from the "Today" period
struct TodayReadings {
    high: i32,
    uv_index: Option<f64>,
    icon_code: String,
    condition: String,
}

impl TodayReadings {
    fn from_first_day(first: Option<&DayForecast>, current_temp: i32) -> Self {
        match first {
            Some(day) => Self {
                high: day.high.unwrap_or(current_temp),
                uv_index: None,
                icon_code: day.icon_code.clone(),
                condition: day.condition.clone(),
            },
            None => Self {
                high: current_temp,
                uv_index: None,
                icon_code: DEFAULT_DAY_ICON.to_string(),
                condition: PLACEHOLDER_CONDITION.to_string(),
            },
        }
    }
}

/// Effective wind gust: the sentinel or an empty reading means "same as speed"
pub fn effective_gust(wind_speed: f64, gust_raw: &str) -> f64 {
    let gust_raw = gust_raw.trim();
    if gust_raw == GUST_SENTINEL || gust_raw.is_empty() {
        return wind_speed;
    }
    parse_number(gust_raw)
        .map(|gust| gust.max(wind_speed))
        .unwrap_or(wind_speed)
}

/// Whether a period label describes daytime conditions
pub fn is_day_period(name: &str) -> bool {
    name != "Tonight" && !name.to_lowercase().contains("night")
}

/// Single-letter label for weekdays, the label itself otherwise
pub fn period_display(name: &str) -> String {
    if WEEKDAYS.contains(&name) {
        name.chars().take(1).collect()
    } else {
        name.to_string()
    }
}

fn location_label(location: Option<&Node>, province: &str) -> String {
    let name = extract_text(location.and_then(|l| l.child("name")));
    if name.is_empty() {
        return province.to_string();
    }

    let code = location
        .and_then(|l| l.child("province"))
        .and_then(|p| p.attribute("code"))
        .map(str::to_uppercase)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| province.to_uppercase());
    format!("{}, {}", name, code)
}

/// Label of a forecast period, e.g. "Today", "Tonight", "Wednesday night"
fn period_name(period: &Node) -> String {
    let node = period.child("period");
    node.and_then(|p| p.attribute("textForecastName"))
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| extract_text(node))
}

/// Finds the temperature tagged with the given class ("high" or "low")
fn temperature_reading(period: &Node, class: &str) -> Option<i32> {
    as_sequence(period.path(&["temperatures", "temperature"]))
        .into_iter()
        .find(|t| t.attribute("class") == Some(class))
        .and_then(|t| parse_number(&extract_text(Some(t))))
        .map(round_temp)
}

fn uv_index(period: &Node) -> Option<f64> {
    parse_number(&extract_text(period.path(&["uv", "index"])))
}

fn icon_code(period: &Node) -> Option<String> {
    pad_icon_code(&extract_text(period.path(&["abbreviatedForecast", "iconCode"])))
}

/// Condition text for a period
///
/// Tries the abbreviated summary, then the cloud/precipitation summary, then
/// the current observed condition (today only), then the icon description.
fn condition_text(period: &Node, current_condition: Option<&str>) -> String {
    let summary = extract_text(period.path(&["abbreviatedForecast", "textSummary"]));
    if !summary.is_empty() {
        return summary;
    }

    let cloud_precip = extract_text(period.path(&["cloudPrecip", "textSummary"]));
    if !cloud_precip.is_empty() {
        return cloud_precip;
    }

    if let Some(current) = current_condition.filter(|c| !c.is_empty()) {
        return current.to_string();
    }

    icon_code(period)
        .as_deref()
        .and_then(icon_description)
        .unwrap_or(PLACEHOLDER_CONDITION)
        .to_string()
}

/// Rounds to the nearest degree, halves toward positive infinity
fn round_temp(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
