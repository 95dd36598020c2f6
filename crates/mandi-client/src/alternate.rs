use std::time::Duration;

use mandi_core::error::AppError;
use mandi_core::models::{Listing, ListingSource, placeholder_image, truncate_name};
use mandi_core::throttle::Throttle;
use mandi_core::traits::AlternateSource;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// The public catalog API quotes USD; listings are shown in INR.
const USD_TO_INR: f64 = 80.0;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<ApiProduct>,
}

#[derive(Debug, Deserialize)]
struct ApiProduct {
    id: u64,
    title: String,
    price: f64,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    stock: i64,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    reviews: Vec<serde_json::Value>,
}

/// Client for a DummyJSON-compatible product search API
/// (`GET {base}/products/search?q=..&limit=..`).
#[derive(Clone)]
pub struct DummyJsonClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    throttle: Option<Throttle>,
}

impl DummyJsonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            throttle: None,
        })
    }

    /// Take a slot from the shared throttle before every request.
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, AppError> {
        let limit = limit.to_string();
        Url::parse_with_params(
            &format!("{}/products/search", self.base_url),
            [("q", query.trim()), ("limit", limit.as_str())],
        )
        .map_err(|e| AppError::InvalidArgument(format!("Invalid alternate API URL: {e}")))
    }

    fn to_listings(&self, products: Vec<ApiProduct>, limit: usize) -> Vec<Listing> {
        products
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, product)| Listing {
                id: format!("alt_{i}"),
                name: truncate_name(&product.title),
                price: (product.price * USD_TO_INR * 100.0).round() / 100.0,
                image: product
                    .images
                    .into_iter()
                    .next()
                    .or(product.thumbnail)
                    .unwrap_or_else(|| placeholder_image(i)),
                rating: product.rating.clamp(0.0, 5.0),
                review_count: u32::try_from(product.reviews.len()).unwrap_or(u32::MAX),
                url: format!("{}/products/{}", self.base_url, product.id),
                source: ListingSource::AlternateApi,
                in_stock: product.stock > 0,
                is_mock: false,
            })
            .collect()
    }
}

impl AlternateSource for DummyJsonClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Listing>, AppError> {
        let url = self.search_url(query, limit)?;
        if let Some(throttle) = &self.throttle {
            throttle.await_slot().await;
        }
        tracing::debug!(%url, "Querying alternate product API");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout.as_secs())
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "Alternate API returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Malformed alternate API response: {e}")))?;

        let listings = self.to_listings(body.products, limit);
        tracing::info!(count = listings.len(), "Alternate API returned products");
        Ok(listings)
    }
}
