//! End-to-end tests for the wired scrape service and the alternate API client.
//!
//! Every upstream (both marketplaces and the alternate API) is served by one
//! local `wiremock` server, so no real network traffic is made.

use std::time::Duration;

use mandi_client::{DummyJsonClient, build_service};
use mandi_core::error::AppError;
use mandi_core::models::{ListingSource, MarketplaceId, SearchMode};
use mandi_core::traits::{AlternateSource, NoSession};
use mandi_core::ScraperConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AMAZON_RESULTS: &str = r#"<html><head><title>Amazon.in : mouse</title></head><body>
  <div data-component-type="s-search-result" class="s-result-item">
    <img class="s-image" src="https://m.media-amazon.com/images/I/61mouse.jpg">
    <h2><a href="/Logitech-M331/dp/B01M0KH7I2"><span>Logitech M331 Silent Plus Wireless Mouse</span></a></h2>
    <span class="a-icon-alt">4.3 out of 5 stars</span>
    <span class="a-price"><span class="a-offscreen">₹1,095.00</span></span>
  </div>
</body></html>"#;

const CAPTCHA: &str = r#"<html><head><title>Robot Check</title></head><body>
  <form action="/errors/validateCaptcha"><input id="captchacharacters" name="field-keywords"></form>
</body></html>"#;

fn products_json() -> serde_json::Value {
    json!({
        "products": [
            {"id": 7, "title": "Wireless Optical Mouse", "price": 12.5, "rating": 4.1, "stock": 3,
             "thumbnail": "https://cdn.dummyjson.com/mouse/thumbnail.png"},
            {"id": 8, "title": "Ergonomic Vertical Mouse", "price": 25.0, "rating": 4.6, "stock": 0}
        ],
        "total": 2, "skip": 0, "limit": 2
    })
}

fn config_for(server: &MockServer) -> ScraperConfig {
    ScraperConfig {
        throttle_delay: Duration::ZERO,
        fetch_timeout: Duration::from_secs(5),
        detail_timeout: Duration::from_secs(5),
        alt_api_timeout: Duration::from_secs(5),
        amazon_url: server.uri(),
        flipkart_url: server.uri(),
        alt_api_url: server.uri(),
        mock_seed: Some(7),
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn alternate_client_queries_search_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .and(query_param("q", "mouse"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = DummyJsonClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    let listings = client.search("mouse", 2).await.unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].price, 1_000.0);
    assert_eq!(listings[0].image, "https://cdn.dummyjson.com/mouse/thumbnail.png");
    assert_eq!(listings[0].url, format!("{}/products/7", server.uri()));
    assert!(listings.iter().all(|l| l.source == ListingSource::AlternateApi));
    assert!(!listings[1].in_stock);
}

#[tokio::test]
async fn alternate_client_surfaces_upstream_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = DummyJsonClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = client.search("mouse", 2).await.unwrap_err();
    assert!(matches!(err, AppError::HttpError(_)), "got {err:?}");
}

#[tokio::test]
async fn alternate_client_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = DummyJsonClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = client.search("mouse", 2).await.unwrap_err();
    assert!(matches!(err, AppError::ParseError(_)), "got {err:?}");
}

#[tokio::test]
async fn search_merges_live_and_alternate_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "mouse"))
        .respond_with(ResponseTemplate::new(200).set_body_string(AMAZON_RESULTS))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAPTCHA))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_json()))
        .expect(1)
        .mount(&server)
        .await;

    let service = build_service(&config_for(&server), NoSession).unwrap();
    service.initialize().await.unwrap();

    let result = service.search("mouse", 4).await.unwrap();

    assert_eq!(result.mode, SearchMode::Live);
    assert_eq!(result.listings.len(), 3);
    // Sorted by ascending price.
    let prices: Vec<f64> = result.listings.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![1_000.0, 1_095.0, 2_000.0]);
    assert_eq!(result.listings[1].source, ListingSource::Amazon);
    assert_eq!(result.listings[1].id, "amazon_0");
    assert_eq!(result.listings[0].id, "alt_flipkart_0");

    let status = service.status();
    assert!(status.initialized);
    assert!(status.last_request_timestamp.is_some());
}

#[tokio::test]
async fn search_labels_fallback_when_every_upstream_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = build_service(&config_for(&server), NoSession).unwrap();
    let result = service.search("running shoes", 6).await.unwrap();

    assert_eq!(result.mode, SearchMode::Fallback);
    assert_eq!(result.listings.len(), 6);
    assert!(result.listings.iter().all(|l| l.is_mock));
}

#[tokio::test]
async fn disabled_scraping_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = build_service(&config_for(&server), NoSession).unwrap();
    service.set_enabled(false);

    let result = service.search_source(MarketplaceId::Flipkart, "laptop", 3).await.unwrap();
    assert_eq!(result.mode, SearchMode::Fallback);
    assert_eq!(result.listings.len(), 3);
}
