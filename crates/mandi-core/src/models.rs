use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names must be strictly longer than this to count as a real product title.
pub const MIN_NAME_LEN: usize = 5;

/// Extracted names are cut to this many characters.
pub const MAX_NAME_LEN: usize = 100;

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingSource {
    #[serde(rename = "Amazon")]
    Amazon,
    #[serde(rename = "Flipkart")]
    Flipkart,
    #[serde(rename = "Alternative API")]
    AlternateApi,
    #[serde(rename = "Mock Data")]
    Mock,
}

impl fmt::Display for ListingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingSource::Amazon => write!(f, "Amazon"),
            ListingSource::Flipkart => write!(f, "Flipkart"),
            ListingSource::AlternateApi => write!(f, "Alternative API"),
            ListingSource::Mock => write!(f, "Mock Data"),
        }
    }
}

/// The two marketplaces scraped live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceId {
    Amazon,
    Flipkart,
}

impl MarketplaceId {
    /// Short lowercase key used in listing ids and log fields.
    pub fn key(&self) -> &'static str {
        match self {
            MarketplaceId::Amazon => "amazon",
            MarketplaceId::Flipkart => "flipkart",
        }
    }

    /// Registrable domain of the marketplace.
    pub fn domain(&self) -> &'static str {
        match self {
            MarketplaceId::Amazon => "amazon.in",
            MarketplaceId::Flipkart => "flipkart.com",
        }
    }

    /// True if `host` is the marketplace domain or one of its subdomains.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let domain = self.domain();
        host == domain || host.ends_with(&format!(".{domain}"))
    }

    pub fn all() -> [MarketplaceId; 2] {
        [MarketplaceId::Amazon, MarketplaceId::Flipkart]
    }
}

impl fmt::Display for MarketplaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for MarketplaceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(MarketplaceId::Amazon),
            "flipkart" => Ok(MarketplaceId::Flipkart),
            other => Err(format!(
                "Unknown marketplace '{other}' (expected amazon or flipkart)"
            )),
        }
    }
}

impl From<MarketplaceId> for ListingSource {
    fn from(id: MarketplaceId) -> Self {
        match id {
            MarketplaceId::Amazon => ListingSource::Amazon,
            MarketplaceId::Flipkart => ListingSource::Flipkart,
        }
    }
}

/// One discovered product offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Unique within one response.
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    /// 0.0 – 5.0
    pub rating: f64,
    pub review_count: u32,
    pub url: String,
    pub source: ListingSource,
    pub in_stock: bool,
    /// True iff the record did not originate from a live fetch.
    pub is_mock: bool,
}

impl Listing {
    /// Live records must carry a positive price and a name longer than
    /// [`MIN_NAME_LEN`] characters. Mock records are always valid.
    pub fn is_valid(&self) -> bool {
        self.is_mock || (self.price > 0.0 && is_valid_name(&self.name))
    }
}

/// True if `name` (trimmed) is long enough to be a product title.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() > MIN_NAME_LEN
}

/// Trim and cut a product name to [`MAX_NAME_LEN`] characters.
pub fn truncate_name(name: &str) -> String {
    name.trim().chars().take(MAX_NAME_LEN).collect()
}

/// Placeholder image used when a listing has none.
pub fn placeholder_image(index: usize) -> String {
    format!("https://picsum.photos/300/300?random={index}")
}

/// One key/value row of a product's specification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

impl Specification {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Extended single-item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub rating: f64,
    pub review_count: u32,
    /// Never empty; falls back to placeholder images.
    pub images: Vec<String>,
    pub specifications: Vec<Specification>,
    pub source: ListingSource,
    pub is_mock: bool,
}

/// Process-wide scraper state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperStatus {
    pub initialized: bool,
    pub scraping_enabled: bool,
    /// True while a rendering session is held open.
    pub source_connected: bool,
    pub last_request_timestamp: Option<DateTime<Utc>>,
}

/// Whether a response is entirely live data or contains synthetic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Live,
    Fallback,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Live => write!(f, "live"),
            SearchMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Listings returned by a search together with the overall mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub listings: Vec<Listing>,
    pub mode: SearchMode,
}

impl SearchResult {
    /// Labels the result `fallback` if any listing is synthetic.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mode = if listings.iter().any(|l| l.is_mock) {
            SearchMode::Fallback
        } else {
            SearchMode::Live
        };
        Self { listings, mode }
    }
}
