//! Field parsers. Each returns `None` to reject a raw value so the next rule
//! in the cascade gets a chance.

use std::sync::LazyLock;

use mandi_core::models::{is_valid_name, truncate_name};
use regex::Regex;
use url::Url;

static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").ok());
static COUNT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d[\d,]*").ok());

/// Shortest digit string accepted as a price; rejects stray single digits.
const MIN_PRICE_DIGITS: usize = 3;

/// Listing title: trimmed, longer than the minimum, cut to the maximum.
pub fn name(raw: &str) -> Option<String> {
    is_valid_name(raw).then(|| truncate_name(raw))
}

/// Any non-blank text, trimmed.
pub fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Whole-rupee price from the first digit run. Currency signs and thousands
/// separators are stripped; paise after a decimal point are ignored.
/// Only the first run counts, so a struck-through MRP or a discount figure
/// later in the same text is never concatenated onto the price.
pub fn price(raw: &str) -> Option<f64> {
    let run = COUNT.as_ref()?.find(raw)?;
    let digits: String = run.as_str().chars().filter(char::is_ascii_digit).collect();
    if digits.len() < MIN_PRICE_DIGITS {
        return None;
    }
    digits
        .parse::<u64>()
        .ok()
        .filter(|p| *p > 0)
        .map(|p| p as f64)
}

/// First decimal number in the text, if it is a 0-5 star rating.
pub fn rating(raw: &str) -> Option<f64> {
    NUMBER
        .as_ref()?
        .find(raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|r| (0.0..=5.0).contains(r))
}

/// First run of digits (thousands separators allowed).
pub fn review_count(raw: &str) -> Option<u32> {
    let run = COUNT.as_ref()?.find(raw)?;
    run.as_str().replace(',', "").parse().ok()
}

/// Product image URL; sprites and relative placeholders are rejected.
pub fn image(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (raw.contains("http") && !raw.contains("sprite")).then(|| raw.to_string())
}

/// Resolve `raw` against `base`, leaving absolute URLs untouched.
pub fn absolute_url(base: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("javascript:") || raw == "#" {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    Url::parse(base)
        .and_then(|base| base.join(raw))
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_formats() {
        assert_eq!(price("1,299."), Some(1299.0));
        assert_eq!(price("₹1,299.00"), Some(1299.0));
        assert_eq!(price("₹ 64,990"), Some(64990.0));
        assert_eq!(price("Rs. 999"), Some(999.0));
        assert_eq!(price("₹1,299₹2,49948% off"), Some(1299.0));
        assert_eq!(price("₹99"), None);
        assert_eq!(price("no price"), None);
        assert_eq!(price("000"), None);
    }

    #[test]
    fn rating_formats() {
        assert_eq!(rating("4.3 out of 5 stars"), Some(4.3));
        assert_eq!(rating("4"), Some(4.0));
        assert_eq!(rating("Rated 12 by users"), None);
        assert_eq!(rating("stars"), None);
    }

    #[test]
    fn review_count_formats() {
        assert_eq!(review_count("(12,345)"), Some(12345));
        assert_eq!(review_count("1,024 Ratings & 98 Reviews"), Some(1024));
        assert_eq!(review_count("none"), None);
    }

    #[test]
    fn image_filter() {
        assert_eq!(
            image("https://m.media-amazon.com/images/I/71abc.jpg").as_deref(),
            Some("https://m.media-amazon.com/images/I/71abc.jpg")
        );
        assert_eq!(image("https://m.media-amazon.com/images/G/31/sprite-nav.png"), None);
        assert_eq!(image("data:image/gif;base64,R0lGOD"), None);
    }

    #[test]
    fn name_length_rule() {
        assert_eq!(name("  Apple iPhone 15  ").as_deref(), Some("Apple iPhone 15"));
        assert_eq!(name("Apple"), None);
        assert_eq!(name(&"x".repeat(300)).map(|n| n.len()), Some(100));
    }

    #[test]
    fn url_resolution() {
        let base = "https://www.amazon.in";
        assert_eq!(
            absolute_url(base, "/dp/B0CHX1W1XY?th=1").as_deref(),
            Some("https://www.amazon.in/dp/B0CHX1W1XY?th=1")
        );
        assert_eq!(
            absolute_url(base, "https://www.flipkart.com/p/itm1").as_deref(),
            Some("https://www.flipkart.com/p/itm1")
        );
        assert_eq!(absolute_url(base, "#"), None);
        assert_eq!(absolute_url(base, "javascript:void(0)"), None);
    }
}
