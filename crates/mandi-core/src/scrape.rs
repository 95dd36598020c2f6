use crate::aggregator::Aggregator;
use crate::error::AppError;
use crate::models::{MarketplaceId, ProductDetails, ScraperStatus, SearchResult};
use crate::status::StatusRegistry;
use crate::traits::{AlternateSource, Marketplace, RenderSession};

/// Entry point for every caller: owns the aggregator, the status flags and
/// the render session.
///
/// Generic over all external dependencies via traits, enabling dependency
/// injection and testability without real HTTP or browser processes.
#[derive(Clone)]
pub struct ScrapeService<M, A, S>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession,
{
    aggregator: Aggregator<M, A>,
    status: StatusRegistry,
    session: S,
}

impl<M, A, S> ScrapeService<M, A, S>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession,
{
    /// `status` must be the same registry the aggregator's ladders read.
    pub fn new(aggregator: Aggregator<M, A>, status: StatusRegistry, session: S) -> Self {
        Self {
            aggregator,
            status,
            session,
        }
    }

    /// Launch the render session. Calling it again once initialized is a no-op.
    ///
    /// On launch failure scraping is disabled and the error returned; the
    /// service keeps answering from the fallback stages.
    pub async fn initialize(&self) -> Result<(), AppError> {
        if self.status.is_initialized() {
            return Ok(());
        }

        tracing::info!("Initializing web scraper");
        match self.session.launch().await {
            Ok(()) => {
                self.status.set_source_connected(self.session.is_connected());
                self.status.set_initialized(true);
                tracing::info!(
                    source_connected = self.session.is_connected(),
                    "Web scraper initialized"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize scraper, falling back to mock data");
                self.status.set_enabled(false);
                self.status.set_source_connected(false);
                Err(e)
            }
        }
    }

    /// Release the render session.
    pub async fn close(&self) -> Result<(), AppError> {
        tracing::info!("Closing web scraper");
        let result = self.session.close().await;
        self.status.set_source_connected(false);
        self.status.set_initialized(false);
        result
    }

    pub async fn search(&self, term: &str, limit: usize) -> Result<SearchResult, AppError> {
        self.aggregator.search(term, limit).await
    }

    pub async fn search_source(
        &self,
        source: MarketplaceId,
        term: &str,
        limit: usize,
    ) -> Result<SearchResult, AppError> {
        tracing::info!(%source, query = %term.trim(), limit, "Searching single marketplace");
        self.aggregator.search_source(source, term, limit).await
    }

    pub async fn trending(&self, limit: usize) -> Result<SearchResult, AppError> {
        self.aggregator.trending(limit).await
    }

    pub async fn details(&self, url: &str) -> Result<ProductDetails, AppError> {
        self.aggregator.details(url).await
    }

    pub fn status(&self) -> ScraperStatus {
        self.status.snapshot()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.status.set_enabled(enabled);
    }
}
