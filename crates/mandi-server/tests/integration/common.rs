use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mandi_core::error::AppError;
use mandi_core::models::{ListingSource, MarketplaceId};
use mandi_core::synthetic::SyntheticCatalog;
use mandi_core::testutil::{MockAlternate, MockMarketplace, MockSession, make_listing};
use mandi_core::{Aggregator, FallbackLadder, ScrapeService, StatusRegistry};
use mandi_server::routes;
use mandi_server::state::AppState;

pub type TestService = ScrapeService<MockMarketplace, MockAlternate, MockSession>;

pub struct TestApp {
    pub router: Router,
    pub service: TestService,
}

/// Build a router over mock marketplaces. Synthetic details can be turned
/// off to exercise the 404 path.
pub fn setup_test_app(
    amazon: MockMarketplace,
    flipkart: MockMarketplace,
    alternate: MockAlternate,
    mock_details: bool,
) -> TestApp {
    let status = StatusRegistry::new(true);
    let catalog = SyntheticCatalog::new(Some(42));
    let ladder = |market: MockMarketplace| {
        FallbackLadder::new(market, alternate.clone(), status.clone(), catalog.clone())
            .with_mock_details(mock_details)
    };
    let aggregator = Aggregator::new(ladder(amazon), ladder(flipkart), catalog.clone());
    let service = ScrapeService::new(aggregator, status, MockSession::new());

    TestApp {
        router: routes::router(Arc::new(AppState::new(service.clone()))),
        service,
    }
}

/// Both marketplaces answer live; the alternate API is down.
pub fn setup_live_app() -> TestApp {
    setup_test_app(
        MockMarketplace::with_listings(
            MarketplaceId::Amazon,
            vec![
                make_listing("amazon_0", "Apple iPhone 15 (128 GB)", 69_900.0, ListingSource::Amazon),
                make_listing("amazon_1", "Samsung Galaxy S24 5G", 74_999.0, ListingSource::Amazon),
            ],
        ),
        MockMarketplace::with_listings(
            MarketplaceId::Flipkart,
            vec![make_listing(
                "flipkart_0",
                "Google Pixel 8a (Aloe, 128 GB)",
                39_999.0,
                ListingSource::Flipkart,
            )],
        ),
        MockAlternate::failing(AppError::NetworkError("unreachable".into())),
        true,
    )
}

/// Issue `request` and return status plus parsed JSON body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}
