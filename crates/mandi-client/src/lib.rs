pub mod alternate;
pub mod bot_guard;
#[cfg(feature = "browser")]
pub mod browser;
pub mod extract;
pub mod fetcher;
pub mod marketplace;

pub use alternate::DummyJsonClient;
#[cfg(feature = "browser")]
pub use browser::BrowserSession;
pub use fetcher::ReqwestFetcher;
pub use marketplace::ScrapedMarketplace;

use mandi_core::error::AppError;
use mandi_core::throttle::{Throttle, ThrottleConfig, ThrottledFetcher};
use mandi_core::traits::RenderSession;
use mandi_core::{
    Aggregator, FallbackLadder, ScrapeService, ScraperConfig, StatusRegistry,
    synthetic::SyntheticCatalog,
};

use crate::marketplace::MarketplaceDef;
use crate::marketplace::amazon::AMAZON;
use crate::marketplace::flipkart::FLIPKART;

/// A marketplace scraped over plain HTTP behind the shared throttle.
pub type LiveMarketplace = ScrapedMarketplace<ThrottledFetcher<ReqwestFetcher>>;

/// The fully wired service used by the binaries.
pub type LiveService<S> = ScrapeService<LiveMarketplace, DummyJsonClient, S>;

/// Wire every collaborator from `config`.
///
/// One throttle gates both marketplaces, detail lookups and the alternate
/// API, and publishes grant times into the service's status registry.
pub fn build_service<S: RenderSession>(
    config: &ScraperConfig,
    session: S,
) -> Result<LiveService<S>, AppError> {
    let status = StatusRegistry::new(config.scraping_enabled);
    let throttle = Throttle::new(
        ThrottleConfig::new(config.throttle_delay).with_jitter(config.throttle_jitter),
    )
    .with_status(status.clone());
    let catalog = SyntheticCatalog::new(config.mock_seed);

    let http = ReqwestFetcher::builder()
        .timeout(config.fetch_timeout)
        .max_redirects(config.max_redirects)
        .build()?;

    let marketplace = |def: &MarketplaceDef, base_url: &str| -> Result<LiveMarketplace, AppError> {
        let search = http.with_referer(format!("{}/", base_url.trim_end_matches('/')));
        let detail = search.with_timeout(config.detail_timeout);
        ScrapedMarketplace::new(
            def,
            base_url,
            ThrottledFetcher::new(search, throttle.clone()),
            ThrottledFetcher::new(detail, throttle.clone()),
        )
    };
    let amazon = marketplace(&AMAZON, &config.amazon_url)?;
    let flipkart = marketplace(&FLIPKART, &config.flipkart_url)?;

    let alternate = DummyJsonClient::new(&config.alt_api_url, config.alt_api_timeout)?
        .with_throttle(throttle.clone());

    let ladder = |market: LiveMarketplace| {
        FallbackLadder::new(market, alternate.clone(), status.clone(), catalog.clone())
            .with_mock_details(config.mock_details)
    };
    let aggregator = Aggregator::new(ladder(amazon), ladder(flipkart), catalog.clone());

    tracing::debug!(
        throttle_ms = config.throttle_delay.as_millis() as u64,
        jitter_ms = config.throttle_jitter.as_millis() as u64,
        amazon = %config.amazon_url,
        flipkart = %config.flipkart_url,
        alternate = %config.alt_api_url,
        "Scrape service wired"
    );
    Ok(ScrapeService::new(aggregator, status, session))
}
