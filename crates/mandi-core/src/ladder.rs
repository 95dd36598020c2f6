//! Per-source fallback ladder.
//!
//! # Stages
//!
//! ```text
//! START -> RATE_LIMITED -> FETCHING --[>=1 valid record]--------------------------> DONE
//!                              |
//!                              +--> BOT_BLOCKED | FETCH_FAILED | EMPTY_RESULT
//!                                        |
//!                                        v
//!                                  ALT_API_ATTEMPT --[ALT_SUCCESS]-----------------> DONE
//!                                        |
//!                                   [ALT_FAILED]
//!                                        v
//!                                  MOCK_GENERATE ---------------------------------> DONE
//! ```
//!
//! With scraping disabled the ladder jumps from START straight to
//! MOCK_GENERATE. Every stage is attempted at most once per run.

use std::fmt;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Listing, MarketplaceId, ProductDetails};
use crate::status::StatusRegistry;
use crate::synthetic::SyntheticCatalog;
use crate::traits::{AlternateSource, Marketplace};

/// A state visited by one ladder run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LadderStage {
    Start,
    RateLimited,
    Fetching,
    BotBlocked,
    FetchFailed,
    EmptyResult,
    AltApiAttempt,
    AltSuccess,
    AltFailed,
    MockGenerate,
    Done,
}

impl fmt::Display for LadderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LadderStage::Start => "START",
            LadderStage::RateLimited => "RATE_LIMITED",
            LadderStage::Fetching => "FETCHING",
            LadderStage::BotBlocked => "BOT_BLOCKED",
            LadderStage::FetchFailed => "FETCH_FAILED",
            LadderStage::EmptyResult => "EMPTY_RESULT",
            LadderStage::AltApiAttempt => "ALT_API_ATTEMPT",
            LadderStage::AltSuccess => "ALT_SUCCESS",
            LadderStage::AltFailed => "ALT_FAILED",
            LadderStage::MockGenerate => "MOCK_GENERATE",
            LadderStage::Done => "DONE",
        };
        write!(f, "{s}")
    }
}

/// Listings produced by a ladder run plus the stages it went through.
#[derive(Debug, Clone)]
pub struct LadderOutcome {
    pub listings: Vec<Listing>,
    pub trail: Vec<LadderStage>,
}

impl LadderOutcome {
    pub fn visited(&self, stage: LadderStage) -> bool {
        self.trail.contains(&stage)
    }
}

/// Runs live scrape → alternate API → synthetic data for one marketplace.
#[derive(Clone)]
pub struct FallbackLadder<M, A> {
    marketplace: M,
    alternate: A,
    status: StatusRegistry,
    catalog: SyntheticCatalog,
    mock_details: bool,
}

impl<M, A> FallbackLadder<M, A>
where
    M: Marketplace,
    A: AlternateSource,
{
    pub fn new(
        marketplace: M,
        alternate: A,
        status: StatusRegistry,
        catalog: SyntheticCatalog,
    ) -> Self {
        Self {
            marketplace,
            alternate,
            status,
            catalog,
            mock_details: true,
        }
    }

    /// Whether detail lookups may fall back to a synthetic record.
    pub fn with_mock_details(mut self, enabled: bool) -> Self {
        self.mock_details = enabled;
        self
    }

    pub fn marketplace_id(&self) -> MarketplaceId {
        self.marketplace.id()
    }

    /// Produce up to `limit` listings for `query`. Never fails: the synthetic
    /// stage always yields exactly `limit` records.
    pub async fn run(&self, query: &str, limit: usize) -> LadderOutcome {
        let source = self.marketplace.id();
        let mut trail = vec![LadderStage::Start];

        if limit == 0 {
            trail.push(LadderStage::Done);
            return LadderOutcome {
                listings: Vec::new(),
                trail,
            };
        }

        if self.status.is_enabled() {
            // The throttle slot itself is taken inside the marketplace's fetcher.
            trail.push(LadderStage::RateLimited);
            trail.push(LadderStage::Fetching);
            tracing::info!(%source, %query, limit, "Scraping marketplace");

            match self.marketplace.search(query, limit).await {
                Ok(listings) => {
                    let listings = keep_valid(listings, limit);
                    if !listings.is_empty() {
                        tracing::info!(%source, count = listings.len(), "Live scrape succeeded");
                        trail.push(LadderStage::Done);
                        return LadderOutcome { listings, trail };
                    }
                    tracing::warn!(%source, "No valid products extracted");
                    trail.push(LadderStage::EmptyResult);
                }
                Err(AppError::BotDetected(marker)) => {
                    tracing::warn!(%source, %marker, "Bot protection detected");
                    trail.push(LadderStage::BotBlocked);
                }
                Err(e) => {
                    tracing::warn!(%source, error = %e, "Marketplace fetch failed");
                    trail.push(LadderStage::FetchFailed);
                }
            }

            trail.push(LadderStage::AltApiAttempt);
            tracing::info!(%source, %query, "Trying alternative data source");

            match self.alternate.search(query, limit).await {
                Ok(listings) => {
                    let listings: Vec<Listing> = keep_valid(listings, limit)
                        .into_iter()
                        .enumerate()
                        .map(|(i, mut listing)| {
                            listing.id = format!("alt_{}_{i}", source.key());
                            listing
                        })
                        .collect();
                    if !listings.is_empty() {
                        tracing::info!(%source, count = listings.len(), "Alternative source succeeded");
                        trail.push(LadderStage::AltSuccess);
                        trail.push(LadderStage::Done);
                        return LadderOutcome { listings, trail };
                    }
                    tracing::warn!(%source, "Alternative source returned no usable products");
                }
                Err(e) => {
                    tracing::warn!(%source, error = %e, "Alternative source failed");
                }
            }
            trail.push(LadderStage::AltFailed);
        } else {
            tracing::debug!(%source, "Scraping disabled, generating synthetic data");
        }

        trail.push(LadderStage::MockGenerate);
        let listings = self
            .catalog
            .listings(query, limit, &format!("mock_{}", source.key()));
        tracing::info!(%source, count = listings.len(), "Using mock data");
        trail.push(LadderStage::Done);

        LadderOutcome { listings, trail }
    }

    /// Live detail page, falling back to a synthetic record.
    ///
    /// Fails with `NotFound` only when nothing could be extracted and
    /// synthetic details are disabled.
    pub async fn details(&self, url: &str) -> Result<ProductDetails, AppError> {
        let source = self.marketplace.id();

        if self.status.is_enabled() {
            match self.marketplace.details(url).await {
                Ok(details) if details.price > 0.0 && !details.name.trim().is_empty() => {
                    return Ok(details);
                }
                Ok(_) => {
                    tracing::warn!(%source, %url, "Detail page held no usable name/price");
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(%source, %url, error = %e, "Detail fetch failed");
                }
                Err(e) => return Err(e),
            }
        }

        if self.mock_details {
            Ok(self.catalog.details(url))
        } else {
            Err(AppError::NotFound(format!("Product details not found for {url}")))
        }
    }
}

/// Drop records violating the listing invariant and cap at `limit`.
fn keep_valid(listings: Vec<Listing>, limit: usize) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(Listing::is_valid)
        .take(limit)
        .collect()
}
