use axum::body::Body;
use axum::http::{Request, StatusCode};

use mandi_core::error::AppError;
use mandi_core::models::{ListingSource, MarketplaceId};
use mandi_core::testutil::{MockAlternate, MockMarketplace, make_details};

use crate::common::{get, send, setup_live_app, setup_test_app};

fn toggle_request(body: &str) -> Request<Body> {
    Request::post("/api/scraper/toggle")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let app = setup_live_app();
    app.service.initialize().await.unwrap();

    let (status, json) = get(app.router, "/api/scraper/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
    assert_eq!(json["data"]["scraping"]["enabled"], true);
    assert_eq!(json["data"]["scraping"]["initialized"], true);
    assert_eq!(json["data"]["scraping"]["sourceConnected"], true);
}

#[tokio::test]
async fn toggle_switches_status_to_fallback() {
    let app = setup_live_app();

    let (status, json) = get(app.router.clone(), "/api/scraper/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "active");
    assert_eq!(json["mode"], "live");

    let (status, json) = send(app.router.clone(), toggle_request(r#"{"enabled": false}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Web scraping disabled");
    assert_eq!(json["data"]["scrapingEnabled"], false);
    assert_eq!(json["data"]["mode"], "fallback");
    assert!(!app.service.status().scraping_enabled);

    let (_, json) = get(app.router, "/api/scraper/status").await;
    assert_eq!(json["status"], "fallback");
    assert_eq!(json["mode"], "mock");
}

#[tokio::test]
async fn toggle_rejects_non_boolean() {
    let app = setup_live_app();

    for body in [r#"{"enabled": "yes"}"#, r#"{}"#, "not json"] {
        let (status, json) = send(app.router.clone(), toggle_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "invalid_argument");
    }
    assert!(app.service.status().scraping_enabled);
}

#[tokio::test]
async fn openapi_document_lists_scraper_paths() {
    let app = setup_live_app();

    let (status, json) = get(app.router, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/scraper/search"].is_object());
    assert!(json["paths"]["/api/scraper/product-details"].is_object());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_without_query_returns_400() {
    let app = setup_live_app();

    for uri in ["/api/scraper/search", "/api/scraper/search?query=%20%20"] {
        let (status, json) = get(app.router.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid argument: Query parameter is required");
    }
}

#[tokio::test]
async fn search_merges_live_results_cheapest_first() {
    let app = setup_live_app();

    let (status, json) = get(app.router, "/api/scraper/search?query=phone&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "live");
    assert_eq!(json["count"], 3);
    assert_eq!(json["query"], "phone");
    assert_eq!(json["message"], "Live data from e-commerce platforms");

    let prices: Vec<f64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![39_999.0, 69_900.0, 74_999.0]);
    assert_eq!(json["data"][0]["source"], "Flipkart");
    assert_eq!(json["data"][0]["isMock"], false);
}

#[tokio::test]
async fn search_with_scraping_disabled_is_fallback() {
    let app = setup_live_app();
    app.service.set_enabled(false);

    let (status, json) = get(app.router, "/api/scraper/search?query=laptop&limit=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "fallback");
    assert_eq!(json["count"], 4);
    assert!(
        json["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|l| l["isMock"] == true && l["source"] == "Mock Data")
    );
}

#[tokio::test]
async fn limit_is_capped_at_50() {
    let app = setup_live_app();
    app.service.set_enabled(false);

    let (_, json) = get(app.router, "/api/scraper/search?query=laptop&limit=500").await;

    assert_eq!(json["count"], 50);
}

#[tokio::test]
async fn trending_defaults_to_eight() {
    let app = setup_live_app();
    app.service.set_enabled(false);

    let (status, json) = get(app.router, "/api/scraper/trending").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 8);
    assert_eq!(json["mode"], "fallback");
    assert_eq!(json["message"], "Using fallback data for trending products");
    assert!(json.get("query").is_none());
}

#[tokio::test]
async fn amazon_endpoint_searches_one_marketplace() {
    let app = setup_live_app();

    let (status, json) = get(app.router, "/api/scraper/amazon?query=iphone").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "Amazon");
    assert_eq!(json["mode"], "live");
    assert_eq!(json["count"], 2);
    assert_eq!(json["message"], "Live Amazon products");
}

#[tokio::test]
async fn flipkart_endpoint_falls_back_when_everything_fails() {
    let app = setup_test_app(
        MockMarketplace::new(MarketplaceId::Amazon),
        MockMarketplace::with_error(
            MarketplaceId::Flipkart,
            AppError::BotDetected("Access Denied".into()),
        ),
        MockAlternate::failing(AppError::Timeout(15)),
        true,
    );

    let (status, json) = get(app.router, "/api/scraper/flipkart?query=headphones&limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "Flipkart");
    assert_eq!(json["mode"], "fallback");
    assert_eq!(json["count"], 3);
    assert_eq!(json["message"], "Using fallback data for Flipkart products");
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_details_requires_url() {
    let app = setup_live_app();

    let (status, json) = get(app.router, "/api/scraper/product-details").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid argument: URL parameter is required");
}

#[tokio::test]
async fn product_details_rejects_unsupported_site() {
    let app = setup_live_app();

    let (status, json) = get(
        app.router,
        "/api/scraper/product-details?url=https%3A%2F%2Fwww.ebay.com%2Fitm%2F1234",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "unsupported_source");
}

#[tokio::test]
async fn product_details_live() {
    let app = setup_test_app(
        MockMarketplace::new(MarketplaceId::Amazon).with_details(Ok(make_details(
            "Apple iPhone 15 (128 GB) - Black",
            69_900.0,
            ListingSource::Amazon,
        ))),
        MockMarketplace::new(MarketplaceId::Flipkart),
        MockAlternate::with_listings(Vec::new()),
        true,
    );

    let (status, json) = get(
        app.router,
        "/api/scraper/product-details?url=https%3A%2F%2Fwww.amazon.in%2Fdp%2FB0CHX1W1XY",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "live");
    assert_eq!(json["data"]["name"], "Apple iPhone 15 (128 GB) - Black");
    assert_eq!(json["data"]["source"], "Amazon");
    assert_eq!(json["data"]["specifications"][0]["key"], "Brand");
}

#[tokio::test]
async fn product_details_not_found_without_mock_fallback() {
    let app = setup_test_app(
        MockMarketplace::new(MarketplaceId::Amazon),
        MockMarketplace::new(MarketplaceId::Flipkart),
        MockAlternate::with_listings(Vec::new()),
        false,
    );

    let (status, json) = get(
        app.router,
        "/api/scraper/product-details?url=https%3A%2F%2Fwww.flipkart.com%2Fitem%2Fp%2Fitm123",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn product_details_mock_fallback_is_labelled() {
    let app = setup_test_app(
        MockMarketplace::new(MarketplaceId::Amazon),
        MockMarketplace::new(MarketplaceId::Flipkart),
        MockAlternate::with_listings(Vec::new()),
        true,
    );

    let (status, json) = get(
        app.router,
        "/api/scraper/product-details?url=https%3A%2F%2Fwww.flipkart.com%2Fitem%2Fp%2Fitm123",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "fallback");
    assert_eq!(json["data"]["isMock"], true);
    assert_eq!(json["message"], "Using fallback data for product details");
}
