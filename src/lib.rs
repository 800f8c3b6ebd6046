//! ecweather library
//!
//! Fetches Environment Canada citypage weather bulletins, normalizes them into
//! a `WeatherSnapshot`, and computes sunrise/sunset for day/night display.

pub mod cli;
pub mod data;
pub mod refresh;
pub mod report;
pub mod sun;

pub use data::{BulletinError, DayForecast, WeatherClient, WeatherSnapshot};
pub use sun::{sun_times, DayKind, SunTimes};
