//! Live marketplace scraping: fetch, bot check and rule-driven extraction.

pub mod amazon;
pub mod flipkart;

use std::sync::Arc;

use mandi_core::error::AppError;
use mandi_core::models::{Listing, MarketplaceId, ProductDetails};
use mandi_core::traits::{Fetcher, Marketplace};
use scraper::Html;

use crate::bot_guard;
use crate::extract::{DetailLayout, DetailSpec, ExtractContext, SearchLayout, SearchSpec};

/// Everything that differs between two marketplaces.
#[derive(Debug)]
pub struct MarketplaceDef {
    pub id: MarketplaceId,
    /// Builds the search page URL from the base URL and the encoded term.
    pub search_url: fn(base: &str, encoded_query: &str) -> String,
    pub search: &'static SearchSpec,
    pub details: &'static DetailSpec,
}

#[derive(Debug)]
struct Layouts {
    search: SearchLayout,
    details: DetailLayout,
}

/// A marketplace scraped over a [`Fetcher`].
///
/// Search pages go through `fetcher`, product pages through `detail_fetcher`
/// (usually the same client with a shorter timeout).
#[derive(Clone)]
pub struct ScrapedMarketplace<F> {
    id: MarketplaceId,
    base_url: String,
    search_url: fn(&str, &str) -> String,
    layouts: Arc<Layouts>,
    fetcher: F,
    detail_fetcher: F,
}

impl<F: Fetcher + 'static> ScrapedMarketplace<F> {
    /// Compile `def`'s selectors. An invalid selector is a `ParseError`.
    pub fn new(
        def: &MarketplaceDef,
        base_url: impl Into<String>,
        fetcher: F,
        detail_fetcher: F,
    ) -> Result<Self, AppError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            id: def.id,
            base_url,
            search_url: def.search_url,
            layouts: Arc::new(Layouts {
                search: SearchLayout::compile(def.search)?,
                details: DetailLayout::compile(def.details)?,
            }),
            fetcher,
            detail_fetcher,
        })
    }

    /// Search page URL for `query`.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
        (self.search_url)(&self.base_url, &encoded)
    }

    fn context<'a>(&'a self, page_url: &'a str) -> ExtractContext<'a> {
        ExtractContext {
            source: self.id,
            base_url: &self.base_url,
            page_url,
        }
    }

    /// Parse a fetched search page. Kept synchronous: `Html` is `!Send`.
    pub fn parse_search(&self, html: &str, page_url: &str, limit: usize) -> Result<Vec<Listing>, AppError> {
        let document = Html::parse_document(html);
        bot_guard::check(&document)?;
        Ok(self
            .layouts
            .search
            .extract(&document, &self.context(page_url), limit))
    }

    /// Parse a fetched product page.
    pub fn parse_details(&self, html: &str, page_url: &str) -> Result<ProductDetails, AppError> {
        let document = Html::parse_document(html);
        bot_guard::check(&document)?;
        self.layouts.details.extract(&document, &self.context(page_url))
    }
}

impl<F: Fetcher + 'static> Marketplace for ScrapedMarketplace<F> {
    fn id(&self) -> MarketplaceId {
        self.id
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Listing>, AppError> {
        let url = self.search_url(query);
        let html = self.fetcher.fetch(&url).await?;
        tracing::debug!(source = %self.id, bytes = html.len(), "Fetched search page");

        let listings = self.parse_search(&html, &url, limit)?;
        tracing::info!(source = %self.id, count = listings.len(), "Extracted products");
        Ok(listings)
    }

    async fn details(&self, url: &str) -> Result<ProductDetails, AppError> {
        let html = self.detail_fetcher.fetch(url).await?;
        self.parse_details(&html, url)
    }
}
