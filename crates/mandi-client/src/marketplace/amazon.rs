use mandi_core::models::MarketplaceId;

use super::MarketplaceDef;
use crate::extract::{DetailSpec, Read, SearchSpec};

fn search_url(base: &str, query: &str) -> String {
    format!("{base}/s?k={query}&ref=sr_pg_1")
}

static SEARCH: SearchSpec = SearchSpec {
    containers: &[
        r#"div[data-component-type="s-search-result"]"#,
        r#"div.s-result-item[data-component-type="s-search-result"]"#,
        r#"div[data-asin]:not([data-asin=""])"#,
        ".sg-col-inner .s-result-item",
        ".s-result-item",
    ],
    name: &[
        ("h2 a span", Read::Text),
        (".a-size-medium.a-color-base.a-text-normal", Read::Text),
        (".a-text-normal", Read::Text),
        (r#"[data-cy="title-recipe"]"#, Read::Text),
        ("h2 span", Read::Text),
        (".a-link-normal span", Read::Text),
        (".a-size-base-plus.a-color-base.a-text-normal", Read::Text),
    ],
    price: &[
        (".a-price-whole", Read::Text),
        (".a-price .a-offscreen", Read::Text),
        (".a-price-current .a-offscreen", Read::Text),
        (".a-price .a-price-whole", Read::Text),
        (".a-price-current .a-price-whole", Read::Text),
    ],
    image: &[
        ("img.s-image", Read::AnyAttr(&["src", "data-src"])),
        (".s-image", Read::AnyAttr(&["src", "data-src"])),
        (r#"img[src*="images"]"#, Read::AnyAttr(&["src", "data-src"])),
        ("img[data-src]", Read::AnyAttr(&["data-src", "src"])),
        ("img", Read::AnyAttr(&["src", "data-src"])),
    ],
    rating: &[
        (".a-icon-alt", Read::TextOrAttr("aria-label")),
        (r#"[aria-label*="stars"]"#, Read::TextOrAttr("aria-label")),
        (".a-icon-star", Read::TextOrAttr("aria-label")),
        (".a-icon-star-small", Read::TextOrAttr("aria-label")),
    ],
    review_count: &[
        (r#"a[href*="customerReviews"] span"#, Read::Text),
        ("span.s-underline-text", Read::Text),
        (r#"[aria-label$="ratings"]"#, Read::AttrOrText("aria-label")),
    ],
    url: &[
        ("h2 a", Read::Attr("href")),
        (".a-link-normal", Read::Attr("href")),
        (r#"a[href*="/dp/"]"#, Read::Attr("href")),
        (r#"a[href*="amazon"]"#, Read::Attr("href")),
    ],
};

static DETAILS: DetailSpec = DetailSpec {
    name: &[("#productTitle", Read::Text), ("h1", Read::Text)],
    price: &[
        (".a-price-whole", Read::Text),
        ("#corePrice_feature_div .a-offscreen", Read::Text),
        (".a-price .a-offscreen", Read::Text),
    ],
    description: &[
        ("#productDescription p", Read::Text),
        ("#productDescription", Read::Text),
        (".a-expander-content p", Read::Text),
        ("#feature-bullets li span", Read::Text),
    ],
    rating: &[
        ("#acrPopover", Read::AttrOrText("title")),
        (".a-icon-alt", Read::Text),
    ],
    review_count: &[("#acrCustomerReviewText", Read::Text)],
    images: &[
        ("#landingImage", Read::AnyAttr(&["data-old-hires", "src"])),
        (r#"img[src*="images"]"#, Read::Attr("src")),
    ],
    spec_rows: &[
        "#productDetails_techSpec_section_1 tr",
        "#productDetails_detailBullets_sections1 tr",
    ],
};

pub static AMAZON: MarketplaceDef = MarketplaceDef {
    id: MarketplaceId::Amazon,
    search_url,
    search: &SEARCH,
    details: &DETAILS,
};
