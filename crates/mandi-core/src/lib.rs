pub mod aggregator;
pub mod config;
pub mod error;
pub mod identity;
pub mod ladder;
pub mod models;
pub mod scrape;
pub mod status;
pub mod synthetic;
pub mod throttle;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use aggregator::Aggregator;
pub use config::ScraperConfig;
pub use error::AppError;
pub use ladder::FallbackLadder;
pub use models::{Listing, ListingSource, MarketplaceId, ProductDetails, SearchResult};
pub use scrape::ScrapeService;
pub use status::StatusRegistry;
pub use traits::{AlternateSource, Fetcher, Marketplace, RenderSession};
