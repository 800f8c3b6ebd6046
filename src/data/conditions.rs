//! Icon code to condition text lookup
//!
//! Environment Canada publishes a two-digit icon code with every forecast
//! period. When a period carries no summary text, the description for its
//! icon code is used instead.

/// Placeholder shown when no condition text can be derived
pub const PLACEHOLDER_CONDITION: &str = "\u{2014}";

/// Descriptions for the published icon codes, indexed by code
///
/// Codes 00-29 are daytime icons, 30-39 their night counterparts, and 40-48
/// cover severe or unusual phenomena.
static ICON_DESCRIPTIONS: [(&str, &str); 49] = [
    ("00", "Sunny"),
    ("01", "Mainly sunny"),
    ("02", "Partly cloudy"),
    ("03", "Mostly cloudy"),
    ("04", "Increasing cloudiness"),
    ("05", "Clearing"),
    ("06", "Chance of showers"),
    ("07", "Chance of rain or flurries"),
    ("08", "Chance of flurries"),
    ("09", "Chance of thunderstorms"),
    ("10", "Cloudy"),
    ("11", "Precipitation"),
    ("12", "Rain"),
    ("13", "Heavy rain"),
    ("14", "Freezing rain"),
    ("15", "Rain and snow"),
    ("16", "Light snow"),
    ("17", "Snow"),
    ("18", "Heavy snow"),
    ("19", "Thunderstorms"),
    ("20", "Cloudy"),
    ("21", "Cloudy"),
    ("22", "Cloudy periods"),
    ("23", "Haze"),
    ("24", "Fog"),
    ("25", "Blowing snow"),
    ("26", "Ice crystals"),
    ("27", "Hail"),
    ("28", "Drizzle"),
    ("29", "Not available"),
    ("30", "Clear"),
    ("31", "Mainly clear"),
    ("32", "Partly cloudy"),
    ("33", "Mostly cloudy"),
    ("34", "Increasing cloudiness"),
    ("35", "Clearing"),
    ("36", "Chance of showers"),
    ("37", "Chance of rain or flurries"),
    ("38", "Chance of flurries"),
    ("39", "Chance of thunderstorms"),
    ("40", "Blowing snow"),
    ("41", "Funnel cloud"),
    ("42", "Tornado"),
    ("43", "Windy"),
    ("44", "Smoke"),
    ("45", "Dust"),
    ("46", "Thunderstorms with hail"),
    ("47", "Thunderstorms with dust"),
    ("48", "Waterspout"),
];

/// Returns the description for a two-digit icon code
pub fn icon_description(code: &str) -> Option<&'static str> {
    ICON_DESCRIPTIONS
        .iter()
        .find(|(icon, _)| *icon == code)
        .map(|(_, description)| *description)
}

/// Zero-pads an icon code to two digits, e.g. "2" -> "02"
pub fn pad_icon_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{:0>2}", trimmed))
}
