use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mandi_core::ScraperConfig;
use mandi_core::models::MarketplaceId;
use mandi_core::traits::RenderSession;

#[derive(Parser)]
#[command(name = "mandi", version, about = "Product search across Amazon.in and Flipkart")]
struct Cli {
    /// Skip live scraping and answer from synthetic data only
    #[arg(long, global = true, default_value_t = false)]
    no_scrape: bool,

    /// Seed for synthetic data and trending picks (makes output reproducible)
    #[arg(long, global = true, env = "MANDI_MOCK_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search both marketplaces, cheapest first
    Search {
        /// Search term
        query: String,

        /// Maximum number of listings
        #[arg(short, long, default_value_t = 10, value_parser = limit_parser())]
        limit: usize,
    },

    /// Listings for a randomly picked trending term
    Trending {
        /// Maximum number of listings
        #[arg(short, long, default_value_t = 8, value_parser = limit_parser())]
        limit: usize,
    },

    /// Details for a single amazon.in or flipkart.com product page
    Details {
        /// Product page URL
        url: String,
    },

    /// Search a single marketplace
    Source {
        /// `amazon` or `flipkart`
        #[arg(value_parser = parse_marketplace)]
        marketplace: MarketplaceId,

        /// Search term
        query: String,

        /// Maximum number of listings
        #[arg(short, long, default_value_t = 10, value_parser = limit_parser())]
        limit: usize,
    },
}

/// Largest `--limit` accepted; matches the HTTP API's cap.
const MAX_LIMIT: u64 = 50;

fn limit_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..=MAX_LIMIT)
}

fn parse_marketplace(raw: &str) -> Result<MarketplaceId, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mandi=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env().context("Invalid scraper configuration")?;
    if cli.no_scrape {
        config.scraping_enabled = false;
    }
    if cli.seed.is_some() {
        config.mock_seed = cli.seed;
    }

    #[cfg(feature = "browser")]
    let session = mandi_client::BrowserSession::new(config.detail_timeout);
    #[cfg(not(feature = "browser"))]
    let session = mandi_core::traits::NoSession;

    run(cli.command, &config, session).await
}

async fn run<S: RenderSession>(command: Commands, config: &ScraperConfig, session: S) -> Result<()> {
    let service = mandi_client::build_service(config, session)?;

    if config.scraping_enabled
        && let Err(e) = service.initialize().await
    {
        tracing::warn!(error = %e, "Render session unavailable, continuing in fallback mode");
    }

    let outcome = match command {
        Commands::Search { query, limit } => {
            let result = service.search(&query, limit).await?;
            tracing::info!(mode = %result.mode, count = result.listings.len(), "Search complete");
            print_json(&result)
        }
        Commands::Trending { limit } => {
            let result = service.trending(limit).await?;
            tracing::info!(mode = %result.mode, count = result.listings.len(), "Trending complete");
            print_json(&result)
        }
        Commands::Details { url } => {
            let details = service
                .details(&url)
                .await
                .with_context(|| format!("Failed to get details for {url}"))?;
            print_json(&details)
        }
        Commands::Source {
            marketplace,
            query,
            limit,
        } => {
            let result = service.search_source(marketplace, &query, limit).await?;
            tracing::info!(%marketplace, mode = %result.mode, count = result.listings.len(), "Search complete");
            print_json(&result)
        }
    };

    service.close().await?;
    outcome
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mandi", "search", "gaming laptop", "--limit", "4", "--no-scrape", "--seed", "7",
        ])
        .unwrap();

        assert!(cli.no_scrape);
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Search { query, limit } => {
                assert_eq!(query, "gaming laptop");
                assert_eq!(limit, 4);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn source_accepts_marketplace_names() {
        let cli = Cli::try_parse_from(["mandi", "source", "Flipkart", "earbuds"]).unwrap();
        match cli.command {
            Commands::Source {
                marketplace,
                limit,
                ..
            } => {
                assert_eq!(marketplace, MarketplaceId::Flipkart);
                assert_eq!(limit, 10);
            }
            _ => panic!("expected source"),
        }

        assert!(Cli::try_parse_from(["mandi", "source", "ebay", "earbuds"]).is_err());
    }

    #[test]
    fn limit_is_bounded() {
        let cli = Cli::try_parse_from(["mandi", "trending", "--limit", "50"]).unwrap();
        assert!(matches!(cli.command, Commands::Trending { limit: 50 }));

        for raw in ["0", "51", "1000000000"] {
            assert!(Cli::try_parse_from(["mandi", "search", "tv", "--limit", raw]).is_err());
            assert!(Cli::try_parse_from(["mandi", "source", "amazon", "tv", "-l", raw]).is_err());
        }
    }

    #[test]
    fn trending_default_limit() {
        let cli = Cli::try_parse_from(["mandi", "trending"]).unwrap();
        assert!(matches!(cli.command, Commands::Trending { limit: 8 }));
    }
}
