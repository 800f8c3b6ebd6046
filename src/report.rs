//! Plain-text rendering of snapshots and sun times for the terminal

use std::fmt::Write;

use chrono_tz::Tz;

use crate::data::{DayForecast, WeatherSnapshot};
use crate::sun::{DayKind, SunTimes};

/// Typographic minus used in front of negative readings
const MINUS: char = '\u{2013}';

/// Formats a reading, swapping a leading hyphen for a typographic minus
pub fn format_numeric(value: impl ToString) -> String {
    let text = value.to_string();
    match text.strip_prefix('-') {
        Some(rest) => format!("{}{}", MINUS, rest),
        None => text,
    }
}

fn format_optional(value: Option<i32>) -> String {
    value.map(|v| format_numeric(v)).unwrap_or_else(|| "--".to_string())
}

/// Renders a snapshot as a short multi-line summary
pub fn render_snapshot(snapshot: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", snapshot.location);
    let _ = writeln!(out, "  {} (icon {})", snapshot.condition, snapshot.icon_code);
    let _ = writeln!(
        out,
        "  Now {}°C, high {}°C, low {}°C",
        format_numeric(snapshot.current_temp),
        format_numeric(snapshot.today_high),
        format_numeric(snapshot.today_low)
    );

    let direction = snapshot
        .wind_direction
        .as_deref()
        .map(|d| format!(" {}", d))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  Wind {} km/h{}, gusting {} km/h",
        snapshot.wind_speed, direction, snapshot.wind_gust
    );

    if let Some(uv) = snapshot.uv_index_today_high {
        let _ = writeln!(out, "  UV index {}", uv);
    }

    if !snapshot.seven_day_forecast.is_empty() {
        let _ = writeln!(out, "  Forecast:");
        for day in &snapshot.seven_day_forecast {
            let _ = writeln!(out, "    {}", render_day(day));
        }
    }

    out
}

fn render_day(day: &DayForecast) -> String {
    let pop = day
        .pop
        .map(|p| format!(", {}% POP", p))
        .unwrap_or_default();
    format!(
        "{:<10} {:>4}/{:<4} {}{}",
        day.period,
        format_optional(day.high),
        format_optional(day.low),
        day.condition,
        pop
    )
}

/// Renders sun times in the given zone
pub fn render_sun_times(times: &SunTimes, tz: Tz) -> String {
    let fmt = |t: chrono::DateTime<chrono::Utc>| t.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string();
    let length = times.day_length();
    let summary = match times.kind {
        DayKind::Regular => format!(
            "Day length {}h {:02}m",
            length.num_hours(),
            length.num_minutes() % 60
        ),
        DayKind::PolarDay => "Sun stays up all day".to_string(),
        DayKind::PolarNight => "Sun stays down all day".to_string(),
    };

    format!(
        "Sunrise    {}\nSolar noon {}\nSunset     {}\n{}\n",
        fmt(times.sunrise),
        fmt(times.solar_noon),
        fmt(times.sunset),
        summary
    )
}
