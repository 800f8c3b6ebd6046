//! Citypage weather client
//!
//! Chains the pipeline stages: locate the station's newest bulletin, parse
//! it, and normalize it into a `WeatherSnapshot`.

use chrono::{DateTime, Utc};
use log::debug;

use super::bulletin::Bulletin;
use super::locator::{BulletinLocator, BulletinSource, HttpSource};
use super::normalize::normalize;
use super::{BulletinError, WeatherSnapshot};

/// Client for fetching normalized weather from the Environment Canada datamart
#[derive(Debug, Clone)]
pub struct WeatherClient<S = HttpSource> {
    locator: BulletinLocator<S>,
}

impl Default for WeatherClient<HttpSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient<HttpSource> {
    /// Create a new WeatherClient with default settings
    pub fn new() -> Self {
        Self {
            locator: BulletinLocator::new(),
        }
    }
}

impl<S: BulletinSource> WeatherClient<S> {
    /// Create a new WeatherClient around a configured locator
    pub fn with_locator(locator: BulletinLocator<S>) -> Self {
        Self { locator }
    }

    /// Fetch the current snapshot for a station
    ///
    /// # Arguments
    /// * `station_code` - Citypage site code, e.g. "s0000403"
    /// * `province` - Two-letter province code, e.g. "AB"
    ///
    /// # Returns
    /// * `Ok(WeatherSnapshot)` - Normalized conditions and forecast
    /// * `Err(BulletinError)` - If no bulletin was found or it was unusable
    pub async fn fetch_snapshot(
        &self,
        station_code: &str,
        province: &str,
    ) -> Result<WeatherSnapshot, BulletinError> {
        self.fetch_snapshot_at(station_code, province, Utc::now()).await
    }

    /// Fetch a snapshot, starting the bucket search at `reference_time`
    pub async fn fetch_snapshot_at(
        &self,
        station_code: &str,
        province: &str,
        reference_time: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, BulletinError> {
        let located = self
            .locator
            .locate(station_code, province, reference_time)
            .await?;
        debug!(
            "Normalizing {} from bucket {:02}",
            located.file_name, located.bucket_hour
        );

        let bulletin = Bulletin::parse(&located.content)?;
        normalize(&bulletin, province)
    }
}

/// Parse and normalize bulletin text that was obtained some other way
pub fn snapshot_from_xml(xml: &str, province: &str) -> Result<WeatherSnapshot, BulletinError> {
    let bulletin = Bulletin::parse(xml)?;
    normalize(&bulletin, province)
}
