use mandi_core::models::MarketplaceId;

use super::MarketplaceDef;
use crate::extract::{DetailSpec, Read, SearchSpec};

fn search_url(base: &str, query: &str) -> String {
    format!(
        "{base}/search?q={query}&otracker=search&otracker1=search&marketplace=FLIPKART&as-show=on&as=off"
    )
}

// Flipkart ships obfuscated class names that change between deploys, so
// several generations are listed.
static SEARCH: SearchSpec = SearchSpec {
    containers: &[
        "div[data-id]",
        "._1AtVbE",
        "._2kHMtA",
        "._4rR01T",
        ".tUxRFH",
        r#"div[class*="_1AtVbE"]"#,
        r#"div[class*="_2kHMtA"]"#,
        r#"div[class*="_4rR01T"]"#,
    ],
    name: &[
        ("div[title]", Read::AttrOrText("title")),
        ("._4rR01T", Read::AttrOrText("title")),
        (".KzDlHZ", Read::Text),
        ("._2WkVRV", Read::AttrOrText("title")),
        ("a[title]", Read::AttrOrText("title")),
        ("h3", Read::Text),
        ("h2", Read::Text),
    ],
    price: &[
        ("._30jeq3", Read::Text),
        (".Nx9bqj", Read::Text),
        (r#"div[class*="price"]"#, Read::Text),
        ("._1_WHN1", Read::Text),
        ("._3I9_wc", Read::Text),
        (r#"[class*="price"]"#, Read::Text),
    ],
    image: &[
        (r#"img[src*="image"]"#, Read::Attr("src")),
        ("img._396cs4", Read::Attr("src")),
        (r#"img[loading="lazy"]"#, Read::AnyAttr(&["src", "data-src"])),
        ("img", Read::AnyAttr(&["src", "data-src"])),
    ],
    rating: &[
        (r#"div[class*="_3LWZlK"]"#, Read::Text),
        (".XQDdHH", Read::Text),
        (r#"span[id^="productRating"]"#, Read::Text),
    ],
    review_count: &[
        ("span._2_R_DZ", Read::Text),
        (".Wphh3N", Read::Text),
        (r#"span[class*="_2_R_DZ"]"#, Read::Text),
    ],
    url: &[
        (r#"a[href*="/p/"]"#, Read::Attr("href")),
        (r#"a[href*="flipkart"]"#, Read::Attr("href")),
        ("a._1fQZEK", Read::Attr("href")),
        ("a", Read::Attr("href")),
    ],
};

static DETAILS: DetailSpec = DetailSpec {
    name: &[
        ("span.B_NuCI", Read::Text),
        ("span.VU-ZEz", Read::Text),
        (r#"h1[class*="title"]"#, Read::Text),
        ("h1", Read::Text),
    ],
    price: &[
        ("div._30jeq3._16Jk6d", Read::Text),
        (".Nx9bqj.CxhGGd", Read::Text),
        (r#"div[class*="price"]"#, Read::Text),
    ],
    description: &[
        ("div._1mXcCf", Read::Text),
        (r#"div[class*="description"]"#, Read::Text),
        ("p", Read::Text),
    ],
    rating: &[(r#"div[class*="_3LWZlK"]"#, Read::Text), (".XQDdHH", Read::Text)],
    review_count: &[("span._2_R_DZ", Read::Text), (".Wphh3N", Read::Text)],
    images: &[
        (r#"img[src*="rukminim"]"#, Read::Attr("src")),
        (r#"img[src*="image"]"#, Read::Attr("src")),
    ],
    spec_rows: &[
        r#"table[class*="_14cfVK"] tr"#,
        r#"div[class*="specification"] table tr"#,
        "table tr",
    ],
};

pub static FLIPKART: MarketplaceDef = MarketplaceDef {
    id: MarketplaceId::Flipkart,
    search_url,
    search: &SEARCH,
    details: &DETAILS,
};
