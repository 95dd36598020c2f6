use std::future::Future;

use crate::error::AppError;
use crate::models::{Listing, MarketplaceId, ProductDetails};

/// Fetches a raw HTML document from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// The live stage of one marketplace: fetch, bot check and extraction.
///
/// `search` returns `Ok(vec![])` when the page parsed but held no valid
/// records, `Err(AppError::BotDetected)` when a challenge page was served,
/// and any other error when the fetch itself failed.
pub trait Marketplace: Send + Sync + Clone + 'static {
    fn id(&self) -> MarketplaceId;

    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Listing>, AppError>> + Send;

    /// Fetch and extract a single product page. Fails with `NotFound` when
    /// the page holds no usable name/price.
    fn details(&self, url: &str) -> impl Future<Output = Result<ProductDetails, AppError>> + Send;
}

/// A secondary public product-search API consulted when live scraping fails.
pub trait AlternateSource: Send + Sync + Clone + 'static {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Listing>, AppError>> + Send;
}

/// A long-lived rendering resource (e.g. a headless browser) held open for
/// the lifetime of the process.
pub trait RenderSession: Send + Sync + Clone {
    fn launch(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn close(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn is_connected(&self) -> bool;
}

/// A no-op RenderSession for deployments that fetch over plain HTTP only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl RenderSession for NoSession {
    async fn launch(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}
