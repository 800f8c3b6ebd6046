//! Bulletin discovery on the Environment Canada datamart
//!
//! Citypage bulletins are published into one directory per UTC hour, and each
//! file name carries an unpredictable issue timestamp. The locator reads the
//! directory listing for the current hour, searches it for the station's file,
//! and walks back one hour at a time when the bucket has nothing yet.

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use log::{debug, trace};
use regex::Regex;
use reqwest::Client;

use super::BulletinError;

/// Base URL of the citypage weather tree on the datamart
pub const DATAMART_BASE_URL: &str = "https://dd.weather.gc.ca/today/citypage_weather";

/// Number of hour buckets searched before giving up
pub const MAX_BUCKET_ATTEMPTS: usize = 3;

/// Product marker embedded in every citypage file name
const PRODUCT_MARKER: &str = "MSC_CitypageWeather";

/// Language suffix of the English bulletin
const LANGUAGE_SUFFIX: &str = "en";

/// Anything that can fetch a URL as text
///
/// Implementations report a missing resource as
/// `BulletinError::UnexpectedStatus`; the locator treats that as an empty
/// bucket and moves on, while any other error aborts the search.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    /// Fetches the body at `url`
    async fn fetch_text(&self, url: &str) -> Result<String, BulletinError>;
}

/// Fetches bulletins over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a new HttpSource with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new HttpSource with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BulletinSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> Result<String, BulletinError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BulletinError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// A bulletin found on the datamart
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedBulletin {
    /// Raw bulletin text
    pub content: String,
    /// UTC hour of the bucket the file was found in
    pub bucket_hour: u32,
    /// File name matched in the listing
    pub file_name: String,
    /// Full URL the bulletin was fetched from
    pub url: String,
}

/// Finds the latest bulletin for a station by searching hourly buckets
#[derive(Debug, Clone)]
pub struct BulletinLocator<S> {
    source: S,
    base_url: String,
}

impl BulletinLocator<HttpSource> {
    /// Create a locator that talks to the public datamart
    pub fn new() -> Self {
        Self::with_source(HttpSource::new())
    }
}

impl Default for BulletinLocator<HttpSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BulletinSource> BulletinLocator<S> {
    /// Create a locator over a custom source
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            base_url: DATAMART_BASE_URL.to_string(),
        }
    }

    /// Point the locator at a different base URL, e.g. a mirror
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Locates and fetches the newest bulletin for a station
    ///
    /// # Arguments
    /// * `station_code` - Citypage site code, e.g. "s0000403"
    /// * `province` - Two-letter province code, e.g. "AB"
    /// * `reference_time` - Current time; its UTC hour is the first bucket tried
    ///
    /// # Returns
    /// * `Ok(LocatedBulletin)` - Content plus the bucket hour it came from
    /// * `Err(BulletinError::NotFound)` - If no bucket listed a matching file
    pub async fn locate(
        &self,
        station_code: &str,
        province: &str,
        reference_time: DateTime<Utc>,
    ) -> Result<LocatedBulletin, BulletinError> {
        let pattern = file_name_pattern(station_code)?;
        let start_hour = reference_time.hour();

        for attempt in 0..MAX_BUCKET_ATTEMPTS {
            let hour = bucket_hour(start_hour, attempt);
            let listing_url = format!("{}/{}/{:02}/", self.base_url, province, hour);
            trace!("Searching bucket {:02} at {}", hour, listing_url);

            let listing = match self.source.fetch_text(&listing_url).await {
                Ok(listing) => listing,
                Err(BulletinError::UnexpectedStatus { status, .. }) => {
                    debug!("Bucket {:02} unavailable (HTTP {})", hour, status);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(file_name) = newest_match(&pattern, &listing) else {
                debug!("No bulletin for {} in bucket {:02}", station_code, hour);
                continue;
            };

            let url = format!("{}{}", listing_url, file_name);
            debug!("Fetching bulletin {}", url);
            let content = self.source.fetch_text(&url).await?;

            return Ok(LocatedBulletin {
                content,
                bucket_hour: hour,
                file_name,
                url,
            });
        }

        Err(BulletinError::NotFound {
            station_code: station_code.to_string(),
            province: province.to_string(),
            attempts: MAX_BUCKET_ATTEMPTS,
        })
    }
}

/// Hour bucket searched on the given attempt, stepping back and wrapping 0 -> 23
pub fn bucket_hour(start_hour: u32, attempt: usize) -> u32 {
    let back = (attempt % 24) as u32;
    (start_hour % 24 + 24 - back) % 24
}

/// Builds the pattern matching a station's bulletin file name
///
/// e.g. `20250115T143012.345Z_MSC_CitypageWeather_s0000403_en.xml`
pub fn file_name_pattern(station_code: &str) -> Result<Regex, BulletinError> {
    let pattern = format!(
        r"\d{{8}}T\d{{6}}\.\d+Z_{}_{}_{}\.xml",
        PRODUCT_MARKER,
        regex::escape(station_code),
        LANGUAGE_SUFFIX
    );
    Ok(Regex::new(&pattern)?)
}

/// Returns the latest matching file name in a listing
///
/// File names start with their issue timestamp, so the lexicographically
/// greatest match is the newest bulletin.
fn newest_match(pattern: &Regex, listing: &str) -> Option<String> {
    pattern
        .find_iter(listing)
        .map(|m| m.as_str())
        .max()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const FILE_NAME: &str = "20250115T143012.345Z_MSC_CitypageWeather_s0000403_en.xml";

    /// Source that answers from a fixed map and records every request
    #[derive(Default)]
    struct ScriptedSource {
        responses: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BulletinSource for ScriptedSource {
        async fn fetch_text(&self, url: &str) -> Result<String, BulletinError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| BulletinError::UnexpectedStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }

    fn listing(files: &[&str]) -> String {
        files
            .iter()
            .map(|f| format!("<a href=\"{f}\">{f}</a>  15-Jan-2025 14:30  12K\n"))
            .collect()
    }

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, 5, 0).unwrap()
    }

    #[test]
    fn test_bucket_hour_steps_back_and_wraps() {
        assert_eq!(bucket_hour(14, 0), 14);
        assert_eq!(bucket_hour(14, 1), 13);
        assert_eq!(bucket_hour(0, 1), 23);
        assert_eq!(bucket_hour(1, 2), 23);
        assert_eq!(bucket_hour(0, 2), 22);
    }

    #[test]
    fn test_pattern_requires_exact_station_and_language() {
        let pattern = file_name_pattern("s0000403").unwrap();
        assert!(pattern.is_match(FILE_NAME));
        assert!(!pattern.is_match("20250115T143012.345Z_MSC_CitypageWeather_s0000404_en.xml"));
        assert!(!pattern.is_match("20250115T143012.345Z_MSC_CitypageWeather_s0000403_fr.xml"));
        assert!(!pattern.is_match("20250115T143012Z_MSC_CitypageWeather_s0000403_en.xml"));
        assert!(!pattern.is_match("2025011T143012.345Z_MSC_CitypageWeather_s0000403_en.xml"));
    }

    #[test]
    fn test_newest_match_prefers_latest_timestamp() {
        let pattern = file_name_pattern("s0000403").unwrap();
        let body = listing(&[
            "20250115T140501.100Z_MSC_CitypageWeather_s0000403_en.xml",
            "20250115T143012.345Z_MSC_CitypageWeather_s0000403_en.xml",
            "20250115T150000.000Z_MSC_CitypageWeather_s0000999_en.xml",
        ]);
        assert_eq!(newest_match(&pattern, &body).as_deref(), Some(FILE_NAME));
        assert_eq!(newest_match(&pattern, "nothing here"), None);
    }

    #[tokio::test]
    async fn test_locate_uses_current_bucket_when_present() {
        let base = "https://example.test/citypage";
        let source = ScriptedSource::default()
            .with(&format!("{base}/AB/14/"), &listing(&[FILE_NAME]))
            .with(&format!("{base}/AB/14/{FILE_NAME}"), "<siteData/>");
        let locator = BulletinLocator::with_source(source).with_base_url(base);

        let located = locator.locate("s0000403", "AB", at_hour(14)).await.unwrap();

        assert_eq!(located.bucket_hour, 14);
        assert_eq!(located.file_name, FILE_NAME);
        assert_eq!(located.content, "<siteData/>");
        assert_eq!(locator.source().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_previous_bucket() {
        let base = "https://example.test/citypage";
        let source = ScriptedSource::default()
            .with(&format!("{base}/AB/00/"), &listing(&[]))
            .with(&format!("{base}/AB/23/"), &listing(&[FILE_NAME]))
            .with(&format!("{base}/AB/23/{FILE_NAME}"), "<siteData/>");
        let locator = BulletinLocator::with_source(source).with_base_url(base);

        let located = locator.locate("s0000403", "AB", at_hour(0)).await.unwrap();

        assert_eq!(located.bucket_hour, 23);
        assert_eq!(located.url, format!("{base}/AB/23/{FILE_NAME}"));
        assert_eq!(
            locator.source().requests(),
            vec![
                format!("{base}/AB/00/"),
                format!("{base}/AB/23/"),
                format!("{base}/AB/23/{FILE_NAME}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_gives_up_after_three_buckets() {
        let base = "https://example.test/citypage";
        let other = "20250115T143012.345Z_MSC_CitypageWeather_s0000999_en.xml";
        let source = ScriptedSource::default()
            .with(&format!("{base}/BC/01/"), &listing(&[other]))
            .with(&format!("{base}/BC/00/"), &listing(&[other]));
        let locator = BulletinLocator::with_source(source).with_base_url(base);

        let err = locator.locate("s0000141", "BC", at_hour(1)).await.unwrap_err();

        match &err {
            BulletinError::NotFound {
                station_code,
                province,
                attempts,
            } => {
                assert_eq!(station_code, "s0000141");
                assert_eq!(province, "BC");
                assert_eq!(*attempts, 3);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(err.to_string().contains("s0000141"));
        assert_eq!(
            locator.source().requests(),
            vec![
                format!("{base}/BC/01/"),
                format!("{base}/BC/00/"),
                format!("{base}/BC/23/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_propagates_file_fetch_failure() {
        let base = "https://example.test/citypage";
        let source = ScriptedSource::default().with(&format!("{base}/AB/14/"), &listing(&[FILE_NAME]));
        let locator = BulletinLocator::with_source(source).with_base_url(base);

        let err = locator.locate("s0000403", "AB", at_hour(14)).await.unwrap_err();
        assert!(matches!(err, BulletinError::UnexpectedStatus { status: 404, .. }));
    }
}
