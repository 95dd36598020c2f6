use mandi_core::error::AppError;
use mandi_core::models::{
    Listing, ListingSource, MarketplaceId, ProductDetails, Specification, placeholder_image,
};
use scraper::{ElementRef, Html, Selector};

use super::{Rule, RuleSpec, compile_rules, compile_selector, compile_selectors, first_accepted, parse};

/// Description used when a detail page has none.
pub const NO_DESCRIPTION: &str = "Product description not available";

/// Images kept from one detail page.
const MAX_DETAIL_IMAGES: usize = 8;

/// Static description of a search results page.
#[derive(Debug)]
pub struct SearchSpec {
    /// Candidate container selectors; the first with at least one match wins.
    pub containers: &'static [&'static str],
    pub name: &'static [RuleSpec],
    pub price: &'static [RuleSpec],
    pub image: &'static [RuleSpec],
    pub rating: &'static [RuleSpec],
    pub review_count: &'static [RuleSpec],
    pub url: &'static [RuleSpec],
}

/// Static description of a product detail page. Rules are evaluated against
/// the whole document.
#[derive(Debug)]
pub struct DetailSpec {
    pub name: &'static [RuleSpec],
    pub price: &'static [RuleSpec],
    pub description: &'static [RuleSpec],
    pub rating: &'static [RuleSpec],
    pub review_count: &'static [RuleSpec],
    /// Every match of every rule is collected, in order.
    pub images: &'static [RuleSpec],
    /// Table rows holding a key cell followed by a value cell.
    pub spec_rows: &'static [&'static str],
}

/// Where a document came from, for ids, sources and URL resolution.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub source: MarketplaceId,
    pub base_url: &'a str,
    pub page_url: &'a str,
}

/// Compiled [`SearchSpec`].
#[derive(Debug, Clone)]
pub struct SearchLayout {
    containers: Vec<Selector>,
    name: Vec<Rule>,
    price: Vec<Rule>,
    image: Vec<Rule>,
    rating: Vec<Rule>,
    review_count: Vec<Rule>,
    url: Vec<Rule>,
}

impl SearchLayout {
    pub fn compile(spec: &SearchSpec) -> Result<Self, AppError> {
        Ok(Self {
            containers: compile_selectors(spec.containers)?,
            name: compile_rules(spec.name)?,
            price: compile_rules(spec.price)?,
            image: compile_rules(spec.image)?,
            rating: compile_rules(spec.rating)?,
            review_count: compile_rules(spec.review_count)?,
            url: compile_rules(spec.url)?,
        })
    }

    /// Up to `limit` valid listings from a results page.
    pub fn extract(&self, document: &Html, ctx: &ExtractContext<'_>, limit: usize) -> Vec<Listing> {
        let Some(containers) = self
            .containers
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
        else {
            tracing::debug!(source = %ctx.source, "No product containers matched");
            return Vec::new();
        };

        tracing::debug!(source = %ctx.source, candidates = containers.len(), "Product containers found");

        let mut listings = Vec::new();
        for (position, card) in containers.into_iter().enumerate() {
            if listings.len() >= limit {
                break;
            }
            match self.listing(card, ctx, listings.len()) {
                Some(listing) => listings.push(listing),
                None => {
                    tracing::debug!(source = %ctx.source, position, "Skipping candidate without valid name/price");
                }
            }
        }
        listings
    }

    fn listing(&self, card: ElementRef<'_>, ctx: &ExtractContext<'_>, index: usize) -> Option<Listing> {
        let name = first_accepted(&self.name, card, parse::name)?;
        let price = first_accepted(&self.price, card, parse::price)?;

        Some(Listing {
            id: format!("{}_{index}", ctx.source.key()),
            name,
            price,
            image: first_accepted(&self.image, card, parse::image)
                .unwrap_or_else(|| placeholder_image(index)),
            rating: first_accepted(&self.rating, card, parse::rating).unwrap_or(0.0),
            review_count: first_accepted(&self.review_count, card, parse::review_count)
                .unwrap_or(0),
            url: first_accepted(&self.url, card, |raw| parse::absolute_url(ctx.base_url, raw))
                .unwrap_or_else(|| ctx.page_url.to_string()),
            source: ctx.source.into(),
            in_stock: true,
            is_mock: false,
        })
    }
}

/// Compiled [`DetailSpec`].
#[derive(Debug, Clone)]
pub struct DetailLayout {
    name: Vec<Rule>,
    price: Vec<Rule>,
    description: Vec<Rule>,
    rating: Vec<Rule>,
    review_count: Vec<Rule>,
    images: Vec<Rule>,
    spec_rows: Vec<Selector>,
    cells: Selector,
}

impl DetailLayout {
    pub fn compile(spec: &DetailSpec) -> Result<Self, AppError> {
        Ok(Self {
            name: compile_rules(spec.name)?,
            price: compile_rules(spec.price)?,
            description: compile_rules(spec.description)?,
            rating: compile_rules(spec.rating)?,
            review_count: compile_rules(spec.review_count)?,
            images: compile_rules(spec.images)?,
            spec_rows: compile_selectors(spec.spec_rows)?,
            cells: compile_selector("th, td")?,
        })
    }

    /// Detail record from a product page. `NotFound` when the page holds no
    /// usable name and price.
    pub fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Result<ProductDetails, AppError> {
        let page = document.root_element();

        let name = first_accepted(&self.name, page, parse::text);
        let price = first_accepted(&self.price, page, parse::price);
        let (Some(name), Some(price)) = (name, price) else {
            return Err(AppError::NotFound(format!(
                "No product name/price on {}",
                ctx.page_url
            )));
        };

        let mut images: Vec<String> = Vec::new();
        for url in self
            .images
            .iter()
            .flat_map(|rule| rule.apply_all(page))
            .filter_map(|raw| parse::image(&raw))
        {
            if images.len() >= MAX_DETAIL_IMAGES {
                break;
            }
            if !images.contains(&url) {
                images.push(url);
            }
        }
        if images.is_empty() {
            images = (1..=3)
                .map(|i| format!("https://picsum.photos/600/600?random={i}"))
                .collect();
        }

        let mut specifications = self.specifications(page);
        if specifications.is_empty() {
            specifications = vec![
                Specification::new("Brand", ListingSource::from(ctx.source).to_string()),
                Specification::new("Availability", "In Stock"),
            ];
        }

        Ok(ProductDetails {
            name,
            price,
            description: first_accepted(&self.description, page, parse::text)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            rating: first_accepted(&self.rating, page, parse::rating).unwrap_or(0.0),
            review_count: first_accepted(&self.review_count, page, parse::review_count)
                .unwrap_or(0),
            images,
            specifications,
            source: ctx.source.into(),
            is_mock: false,
        })
    }

    fn specifications(&self, page: ElementRef<'_>) -> Vec<Specification> {
        let Some(rows) = self
            .spec_rows
            .iter()
            .map(|sel| page.select(sel).collect::<Vec<_>>())
            .find(|rows| !rows.is_empty())
        else {
            return Vec::new();
        };

        rows.into_iter()
            .filter_map(|row| {
                let mut cells = row
                    .select(&self.cells)
                    .filter_map(|cell| parse::text(&cell.text().collect::<String>()));
                let key = cells.next()?;
                let value = cells.next()?;
                Some(Specification::new(squash(&key), squash(&value)))
            })
            .collect()
    }
}

/// Collapse internal whitespace runs to single spaces.
fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Read;

    static SEARCH: SearchSpec = SearchSpec {
        containers: &["div.missing", "div.card"],
        name: &[("h2", Read::Text)],
        price: &[("span.price", Read::Text)],
        image: &[("img", Read::AnyAttr(&["src", "data-src"]))],
        rating: &[("i.stars", Read::TextOrAttr("aria-label"))],
        review_count: &[("span.reviews", Read::Text)],
        url: &[("a", Read::Attr("href"))],
    };

    static DETAIL: DetailSpec = DetailSpec {
        name: &[("#title", Read::Text), ("h1", Read::Text)],
        price: &[("span.price", Read::Text)],
        description: &[("#description p", Read::Text)],
        rating: &[("i.stars", Read::TextOrAttr("aria-label"))],
        review_count: &[("span.reviews", Read::Text)],
        images: &[("img", Read::Attr("src"))],
        spec_rows: &["table.specs tr"],
    };

    fn ctx() -> ExtractContext<'static> {
        ExtractContext {
            source: MarketplaceId::Amazon,
            base_url: "https://www.amazon.in",
            page_url: "https://www.amazon.in/s?k=phone",
        }
    }

    const RESULTS: &str = r#"<html><body>
        <div class="card">
            <h2>Redmi 13C 5G (Starlight Black, 4GB RAM)</h2>
            <span class="price">₹9,199</span>
            <img src="https://m.media-amazon.com/images/I/81a.jpg">
            <i class="stars" aria-label="4.1 out of 5 stars"></i>
            <span class="reviews">(3,210)</span>
            <a href="/dp/B0CN1"></a>
        </div>
        <div class="card">
            <h2>Tiny</h2>
            <span class="price">₹499</span>
        </div>
        <div class="card">
            <h2>Samsung Galaxy M14 5G</h2>
            <span class="price">No offers</span>
        </div>
        <div class="card">
            <h2>realme narzo N55 (Prime Blue)</h2>
            <span class="price">₹10,999</span>
        </div>
        <div class="card">
            <h2>POCO C65 (Pastel Blue, 128 GB)</h2>
            <span class="price">₹7,499</span>
        </div>
    </body></html>"#;

    #[test]
    fn extracts_valid_cards_and_skips_the_rest() {
        let layout = SearchLayout::compile(&SEARCH).unwrap();
        let doc = Html::parse_document(RESULTS);

        let listings = layout.extract(&doc, &ctx(), 10);

        assert_eq!(listings.len(), 3);
        let first = &listings[0];
        assert_eq!(first.id, "amazon_0");
        assert_eq!(first.price, 9199.0);
        assert_eq!(first.rating, 4.1);
        assert_eq!(first.review_count, 3210);
        assert_eq!(first.url, "https://www.amazon.in/dp/B0CN1");
        assert_eq!(first.source, ListingSource::Amazon);
        assert!(!first.is_mock);

        let second = &listings[1];
        assert_eq!(second.id, "amazon_1");
        assert_eq!(second.image, placeholder_image(1));
        assert_eq!(second.url, "https://www.amazon.in/s?k=phone");
        assert_eq!(second.rating, 0.0);
    }

    #[test]
    fn stops_at_limit() {
        let layout = SearchLayout::compile(&SEARCH).unwrap();
        let doc = Html::parse_document(RESULTS);
        assert_eq!(layout.extract(&doc, &ctx(), 2).len(), 2);
        assert!(layout.extract(&doc, &ctx(), 0).is_empty());
    }

    #[test]
    fn no_containers_yields_nothing() {
        let layout = SearchLayout::compile(&SEARCH).unwrap();
        let doc = Html::parse_document("<html><body><p>Nothing here</p></body></html>");
        assert!(layout.extract(&doc, &ctx(), 5).is_empty());
    }

    #[test]
    fn detail_page_with_specs() {
        let layout = DetailLayout::compile(&DETAIL).unwrap();
        let doc = Html::parse_document(
            r#"<html><body>
            <h1>  OnePlus Nord CE4 (Celadon Marble)  </h1>
            <span class="price">₹24,999.00</span>
            <div id="description"><p>Powered by Snapdragon 7 Gen 3.</p></div>
            <i class="stars" aria-label="4.4 out of 5 stars"></i>
            <img src="https://img.example/1.jpg"><img src="https://img.example/1.jpg">
            <img src="https://img.example/sprite.png"><img src="https://img.example/2.jpg">
            <table class="specs">
                <tr><th>Brand</th><td>OnePlus</td></tr>
                <tr><th>RAM   Memory</th><td>8 GB</td></tr>
                <tr><td>orphan</td></tr>
            </table>
            </body></html>"#,
        );

        let details = layout.extract(&doc, &ctx()).unwrap();

        assert_eq!(details.name, "OnePlus Nord CE4 (Celadon Marble)");
        assert_eq!(details.price, 24999.0);
        assert_eq!(details.description, "Powered by Snapdragon 7 Gen 3.");
        assert_eq!(details.rating, 4.4);
        assert_eq!(
            details.images,
            vec!["https://img.example/1.jpg", "https://img.example/2.jpg"]
        );
        assert_eq!(
            details.specifications,
            vec![
                Specification::new("Brand", "OnePlus"),
                Specification::new("RAM Memory", "8 GB"),
            ]
        );
    }

    #[test]
    fn sparse_detail_page_gets_defaults() {
        let layout = DetailLayout::compile(&DETAIL).unwrap();
        let doc = Html::parse_document(
            "<html><body><h1>Boat Airdopes 141</h1><span class=\"price\">₹1,099</span></body></html>",
        );

        let details = layout.extract(&doc, &ctx()).unwrap();

        assert_eq!(details.description, NO_DESCRIPTION);
        assert_eq!(details.images.len(), 3);
        assert_eq!(
            details.specifications,
            vec![
                Specification::new("Brand", "Amazon"),
                Specification::new("Availability", "In Stock"),
            ]
        );
    }

    #[test]
    fn detail_without_price_is_not_found() {
        let layout = DetailLayout::compile(&DETAIL).unwrap();
        let doc = Html::parse_document("<html><body><h1>Currently unavailable</h1></body></html>");
        assert!(matches!(
            layout.extract(&doc, &ctx()),
            Err(AppError::NotFound(_))
        ));
    }
}
