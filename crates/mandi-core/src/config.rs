use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_AMAZON_URL: &str = "https://www.amazon.in";
pub const DEFAULT_FLIPKART_URL: &str = "https://www.flipkart.com";
pub const DEFAULT_ALT_API_URL: &str = "https://dummyjson.com";

/// Runtime configuration for the scraper.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Minimum spacing between any two outbound requests.
    pub throttle_delay: Duration,
    /// Upper bound of the random extra wait added to `throttle_delay`.
    pub throttle_jitter: Duration,
    /// Timeout for marketplace search pages.
    pub fetch_timeout: Duration,
    /// Timeout for product detail pages.
    pub detail_timeout: Duration,
    /// Maximum redirects followed per fetch.
    pub max_redirects: usize,
    pub amazon_url: String,
    pub flipkart_url: String,
    pub alt_api_url: String,
    pub alt_api_timeout: Duration,
    /// Serve a synthetic record when a detail page yields nothing.
    /// When false such lookups fail with `NotFound`.
    pub mock_details: bool,
    /// Seed for synthetic data and trending picks. `None` seeds from the OS.
    pub mock_seed: Option<u64>,
    /// Initial value of the scraping-enabled flag.
    pub scraping_enabled: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            throttle_delay: Duration::from_millis(2000),
            throttle_jitter: Duration::ZERO,
            fetch_timeout: Duration::from_secs(45),
            detail_timeout: Duration::from_secs(30),
            max_redirects: 5,
            amazon_url: DEFAULT_AMAZON_URL.to_string(),
            flipkart_url: DEFAULT_FLIPKART_URL.to_string(),
            alt_api_url: DEFAULT_ALT_API_URL.to_string(),
            alt_api_timeout: Duration::from_secs(15),
            mock_details: true,
            mock_seed: None,
            scraping_enabled: true,
        }
    }
}

impl ScraperConfig {
    /// Read configuration from environment variables, falling back to defaults.
    ///
    /// - `MANDI_THROTTLE_MS`, `MANDI_THROTTLE_JITTER_MS`
    /// - `MANDI_FETCH_TIMEOUT_SECS`, `MANDI_DETAIL_TIMEOUT_SECS`
    /// - `MANDI_MAX_REDIRECTS`
    /// - `MANDI_AMAZON_URL`, `MANDI_FLIPKART_URL`, `MANDI_ALT_API_URL`
    /// - `MANDI_ALT_API_TIMEOUT_SECS`
    /// - `MANDI_MOCK_DETAILS`, `MANDI_MOCK_SEED`, `MANDI_SCRAPING_ENABLED`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let throttle_delay = parse_var::<u64>(&lookup, "MANDI_THROTTLE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.throttle_delay);
        let throttle_jitter = parse_var::<u64>(&lookup, "MANDI_THROTTLE_JITTER_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.throttle_jitter);
        let fetch_timeout = parse_secs(&lookup, "MANDI_FETCH_TIMEOUT_SECS")?
            .unwrap_or(defaults.fetch_timeout);
        let detail_timeout = parse_secs(&lookup, "MANDI_DETAIL_TIMEOUT_SECS")?
            .unwrap_or(defaults.detail_timeout);
        let alt_api_timeout = parse_secs(&lookup, "MANDI_ALT_API_TIMEOUT_SECS")?
            .unwrap_or(defaults.alt_api_timeout);
        let max_redirects =
            parse_var::<usize>(&lookup, "MANDI_MAX_REDIRECTS")?.unwrap_or(defaults.max_redirects);

        Ok(Self {
            throttle_delay,
            throttle_jitter,
            fetch_timeout,
            detail_timeout,
            max_redirects,
            amazon_url: parse_url(&lookup, "MANDI_AMAZON_URL")?.unwrap_or(defaults.amazon_url),
            flipkart_url: parse_url(&lookup, "MANDI_FLIPKART_URL")?
                .unwrap_or(defaults.flipkart_url),
            alt_api_url: parse_url(&lookup, "MANDI_ALT_API_URL")?.unwrap_or(defaults.alt_api_url),
            alt_api_timeout,
            mock_details: parse_var::<bool>(&lookup, "MANDI_MOCK_DETAILS")?
                .unwrap_or(defaults.mock_details),
            mock_seed: parse_var::<u64>(&lookup, "MANDI_MOCK_SEED")?,
            scraping_enabled: parse_var::<bool>(&lookup, "MANDI_SCRAPING_ENABLED")?
                .unwrap_or(defaults.scraping_enabled),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::ConfigError(format!("Invalid {key} '{raw}'"))
        }),
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, AppError> {
    match parse_var::<u64>(lookup, key)? {
        Some(0) => Err(AppError::ConfigError(format!("{key} must be at least 1"))),
        other => Ok(other.map(Duration::from_secs)),
    }
}

fn parse_url(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<String>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            url::Url::parse(raw.trim())
                .map_err(|e| AppError::ConfigError(format!("Invalid {key} '{raw}': {e}")))?;
            Ok(Some(raw.trim().trim_end_matches('/').to_string()))
        }
    }
}
