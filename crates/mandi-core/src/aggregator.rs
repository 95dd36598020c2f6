use tokio::task::JoinError;
use url::Url;
use uuid::Uuid;

use crate::error::AppError;
use crate::ladder::{FallbackLadder, LadderOutcome};
use crate::models::{MarketplaceId, ProductDetails, SearchResult};
use crate::synthetic::SyntheticCatalog;
use crate::traits::{AlternateSource, Marketplace};

/// Terms `trending` chooses from.
pub const TRENDING_TERMS: &[&str] = &[
    "smartphone",
    "laptop",
    "headphones",
    "smartwatch",
    "camera",
    "gaming console",
    "tablet",
    "speaker",
    "keyboard",
    "mouse",
];

/// Fans a query out to both marketplaces and merges the results.
#[derive(Clone)]
pub struct Aggregator<M, A> {
    primary: FallbackLadder<M, A>,
    secondary: FallbackLadder<M, A>,
    catalog: SyntheticCatalog,
}

impl<M, A> Aggregator<M, A>
where
    M: Marketplace,
    A: AlternateSource,
{
    pub fn new(
        primary: FallbackLadder<M, A>,
        secondary: FallbackLadder<M, A>,
        catalog: SyntheticCatalog,
    ) -> Self {
        Self {
            primary,
            secondary,
            catalog,
        }
    }

    fn ladder(&self, id: MarketplaceId) -> Option<&FallbackLadder<M, A>> {
        [&self.primary, &self.secondary]
            .into_iter()
            .find(|ladder| ladder.marketplace_id() == id)
    }

    /// Search both marketplaces concurrently.
    ///
    /// Each branch asks for `ceil(limit / 2)` records. A branch that fails
    /// outright contributes nothing; the other branch's results are still used.
    /// The merged set is sorted ascending by price and cut to `limit`.
    pub async fn search(&self, term: &str, limit: usize) -> Result<SearchResult, AppError> {
        let term = validate_term(term)?;
        let search_id = Uuid::new_v4();
        let per_branch = limit.div_ceil(2);
        tracing::info!(%search_id, query = %term, limit, "Searching all marketplaces");

        let (first, second) = tokio::join!(
            spawn_branch(self.primary.clone(), term.clone(), per_branch),
            spawn_branch(self.secondary.clone(), term.clone(), per_branch),
        );

        let mut listings = Vec::new();
        for (source, branch) in [
            (self.primary.marketplace_id(), first),
            (self.secondary.marketplace_id(), second),
        ] {
            match branch {
                Ok(outcome) => {
                    tracing::debug!(%search_id, %source, trail = ?outcome.trail, "Branch settled");
                    listings.extend(outcome.listings);
                }
                Err(e) => {
                    tracing::error!(%search_id, %source, error = %e, "Search branch failed");
                }
            }
        }

        if listings.is_empty() {
            tracing::warn!(%search_id, "Both branches came back empty, using mock data");
            listings = self.catalog.listings(&term, limit, "mock");
        } else {
            listings.sort_by(|a, b| a.price.total_cmp(&b.price));
            listings.truncate(limit);
        }

        let result = SearchResult::from_listings(listings);
        tracing::info!(
            %search_id,
            count = result.listings.len(),
            mode = %result.mode,
            "Search complete"
        );
        Ok(result)
    }

    /// Search a single marketplace through its own ladder.
    pub async fn search_source(
        &self,
        id: MarketplaceId,
        term: &str,
        limit: usize,
    ) -> Result<SearchResult, AppError> {
        let term = validate_term(term)?;
        let ladder = self
            .ladder(id)
            .ok_or_else(|| AppError::UnsupportedSource(id.to_string()))?;

        let outcome = ladder.run(&term, limit).await;
        Ok(SearchResult::from_listings(outcome.listings))
    }

    /// Search a term drawn at random from [`TRENDING_TERMS`].
    pub async fn trending(&self, limit: usize) -> Result<SearchResult, AppError> {
        let term = self.catalog.pick(TRENDING_TERMS).unwrap_or("smartphone");
        tracing::info!(query = %term, "Getting trending products");
        self.search(term, limit).await
    }

    /// Product details for a marketplace URL.
    pub async fn details(&self, url: &str) -> Result<ProductDetails, AppError> {
        let id = route_url(url)?;
        let ladder = self
            .ladder(id)
            .ok_or_else(|| AppError::UnsupportedSource(id.to_string()))?;
        tracing::info!(source = %id, %url, "Getting product details");
        ladder.details(url.trim()).await
    }
}

fn validate_term(term: &str) -> Result<String, AppError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::InvalidArgument(
            "Search term must not be empty".to_string(),
        ));
    }
    Ok(term.to_string())
}

/// Map a product URL to the marketplace that serves it.
pub fn route_url(url: &str) -> Result<MarketplaceId, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::InvalidArgument("URL must not be empty".to_string()));
    }
    let parsed =
        Url::parse(url).map_err(|e| AppError::InvalidArgument(format!("Invalid URL '{url}': {e}")))?;
    let host = parsed.host_str().unwrap_or_default();

    MarketplaceId::all()
        .into_iter()
        .find(|id| id.matches_host(host))
        .ok_or_else(|| {
            AppError::UnsupportedSource(format!(
                "Unsupported website '{host}'. Only amazon.in and flipkart.com are supported"
            ))
        })
}

/// Run one ladder on its own task so a panic stays inside the branch.
async fn spawn_branch<M, A>(
    ladder: FallbackLadder<M, A>,
    term: String,
    limit: usize,
) -> Result<LadderOutcome, JoinError>
where
    M: Marketplace,
    A: AlternateSource,
{
    tokio::spawn(async move { ladder.run(&term, limit).await }).await
}
