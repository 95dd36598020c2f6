use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mandi_core::models::{Listing, ProductDetails, SearchMode, SearchResult, Specification};

/// Default number of listings for search endpoints.
pub const DEFAULT_LIMIT: usize = 10;

/// Default number of listings for the trending endpoint.
pub const DEFAULT_TRENDING_LIMIT: usize = 8;

/// Hard cap on any requested limit.
pub const MAX_LIMIT: usize = 50;

/// Parse a `limit` query value. Missing or non-numeric values fall back to
/// `default`; everything is capped at [`MAX_LIMIT`].
pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .min(MAX_LIMIT)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search term (required).
    pub query: Option<String>,
    /// Number of listings, default 10, capped at 50.
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendingQuery {
    /// Number of listings, default 8, capped at 50.
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetailsQuery {
    /// Product page URL on amazon.in or flipkart.com.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ToggleRequest {
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub rating: f64,
    pub review_count: u32,
    pub url: String,
    /// `Amazon`, `Flipkart`, `Alternative API` or `Mock Data`.
    pub source: String,
    pub in_stock: bool,
    pub is_mock: bool,
}

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            name: l.name,
            price: l.price,
            image: l.image,
            rating: l.rating,
            review_count: l.review_count,
            url: l.url,
            source: l.source.to_string(),
            in_stock: l.in_stock,
            is_mock: l.is_mock,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListingsResponse {
    pub success: bool,
    pub data: Vec<ListingResponse>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// `live` or `fallback`.
    pub mode: String,
    pub message: String,
}

impl ListingsResponse {
    /// Wrap a search result. `live_message` / `fallback_message` are picked by mode.
    pub fn new(result: SearchResult, live_message: &str, fallback_message: &str) -> Self {
        let message = match result.mode {
            SearchMode::Live => live_message,
            SearchMode::Fallback => fallback_message,
        };
        let data: Vec<ListingResponse> =
            result.listings.into_iter().map(ListingResponse::from).collect();
        Self {
            success: true,
            count: data.len(),
            data,
            query: None,
            source: None,
            mode: result.mode.to_string(),
            message: message.to_string(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Product details
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SpecificationResponse {
    pub key: String,
    pub value: String,
}

impl From<Specification> for SpecificationResponse {
    fn from(s: Specification) -> Self {
        Self {
            key: s.key,
            value: s.value,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailsResponse {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub rating: f64,
    pub review_count: u32,
    pub images: Vec<String>,
    pub specifications: Vec<SpecificationResponse>,
    pub source: String,
    pub is_mock: bool,
}

impl From<ProductDetails> for ProductDetailsResponse {
    fn from(d: ProductDetails) -> Self {
        Self {
            name: d.name,
            price: d.price,
            description: d.description,
            rating: d.rating,
            review_count: d.review_count,
            images: d.images,
            specifications: d
                .specifications
                .into_iter()
                .map(SpecificationResponse::from)
                .collect(),
            source: d.source.to_string(),
            is_mock: d.is_mock,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DetailsEnvelope {
    pub success: bool,
    pub data: ProductDetailsResponse,
    pub mode: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    /// `active` or `fallback`.
    pub status: String,
    /// `live` or `mock`.
    pub mode: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleData {
    pub scraping_enabled: bool,
    pub mode: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ToggleResponse {
    pub success: bool,
    pub message: String,
    pub data: ToggleData,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingHealth {
    pub enabled: bool,
    pub initialized: bool,
    pub source_connected: bool,
    pub last_request_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub service: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub scraping: ScrapingHealth,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub data: HealthData,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(parse_limit(None, DEFAULT_LIMIT), 10);
        assert_eq!(parse_limit(Some("abc"), DEFAULT_TRENDING_LIMIT), 8);
        assert_eq!(parse_limit(Some(" 12 "), DEFAULT_LIMIT), 12);
        assert_eq!(parse_limit(Some("500"), DEFAULT_LIMIT), MAX_LIMIT);
        assert_eq!(parse_limit(Some("-3"), DEFAULT_LIMIT), 10);
    }
}
