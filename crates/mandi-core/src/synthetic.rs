//! Synthetic listings and product details, the terminal stage of every
//! fallback. Output is driven by an injectable seeded RNG so tests can pin it.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::models::{Listing, ListingSource, ProductDetails, Specification, placeholder_image};

const BRANDS: &[&str] = &[
    "Samsung", "Apple", "Sony", "LG", "Dell", "HP", "Lenovo", "Asus", "Acer", "MSI",
];

/// Keyword → product-line vocabulary. The first keyword found in the query wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "smartphone",
        &["Galaxy S23", "iPhone 15", "OnePlus 11", "Pixel 7", "Xiaomi 13"],
    ),
    (
        "laptop",
        &["MacBook Pro", "Dell XPS", "HP Spectre", "Lenovo ThinkPad", "Asus ROG"],
    ),
    (
        "headphones",
        &["Sony WH-1000XM5", "Bose QuietComfort", "AirPods Pro", "Samsung Galaxy Buds"],
    ),
    (
        "smartwatch",
        &["Apple Watch", "Samsung Galaxy Watch", "Fitbit Sense", "Garmin Fenix"],
    ),
    (
        "camera",
        &["Canon EOS R5", "Sony A7 IV", "Nikon Z6", "Fujifilm X-T4"],
    ),
    (
        "gaming console",
        &["PlayStation 5", "Xbox Series X", "Nintendo Switch OLED", "Steam Deck"],
    ),
    (
        "tablet",
        &["iPad Air", "Galaxy Tab S9", "Xiaomi Pad 6", "Lenovo Tab P12"],
    ),
    (
        "speaker",
        &["SoundLink Flex", "JBL Charge 5", "Echo Dot", "HomePod mini"],
    ),
    (
        "keyboard",
        &["MX Keys", "K380 Multi-Device", "BlackWidow V4", "Keychron K2"],
    ),
    (
        "mouse",
        &["MX Master 3S", "G502 Hero", "DeathAdder V3", "Pebble M350"],
    ),
];

const DEFAULT_CATEGORY: &str = "smartphone";

/// Returns the vocabulary category whose keyword appears in `query`.
pub fn category_for(query: &str) -> &'static str {
    let query = query.to_lowercase();
    CATEGORIES
        .iter()
        .map(|(keyword, _)| *keyword)
        .find(|keyword| query.contains(keyword))
        .unwrap_or(DEFAULT_CATEGORY)
}

fn product_lines(category: &str) -> &'static [&'static str] {
    CATEGORIES
        .iter()
        .find(|(keyword, _)| *keyword == category)
        .map(|(_, lines)| *lines)
        .unwrap_or(CATEGORIES[0].1)
}

/// Generator for clearly flagged synthetic records.
#[derive(Debug, Clone)]
pub struct SyntheticCatalog {
    rng: Arc<Mutex<StdRng>>,
}

impl Default for SyntheticCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SyntheticCatalog {
    /// A fixed `seed` makes every generated value reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// Uniform pick from `items`. Returns `None` only when `items` is empty.
    pub fn pick<'a>(&self, items: &[&'a str]) -> Option<&'a str> {
        self.with_rng(|rng| items.choose(rng).copied())
    }

    /// Exactly `limit` synthetic listings themed after `query`.
    ///
    /// Ids are `{id_prefix}_{index}`, so distinct prefixes keep ids unique
    /// when several batches land in the same response.
    pub fn listings(&self, query: &str, limit: usize, id_prefix: &str) -> Vec<Listing> {
        let lines = product_lines(category_for(query));

        self.with_rng(|rng| {
            (0..limit)
                .map(|i| {
                    let brand = BRANDS.choose(rng).copied().unwrap_or("Generic");
                    let line = lines.choose(rng).copied().unwrap_or("Product");
                    Listing {
                        id: format!("{id_prefix}_{i}"),
                        name: format!("{brand} {line}"),
                        price: f64::from(rng.random_range(5_000u32..55_000)),
                        image: placeholder_image(i),
                        rating: random_rating(rng),
                        review_count: rng.random_range(50..1_050),
                        url: format!("https://example.com/product/{i}"),
                        source: ListingSource::Mock,
                        in_stock: true,
                        is_mock: true,
                    }
                })
                .collect()
        })
    }

    /// A synthetic detail record for `url`.
    pub fn details(&self, url: &str) -> ProductDetails {
        self.with_rng(|rng| ProductDetails {
            name: "Sample Product".to_string(),
            price: f64::from(rng.random_range(5_000u32..55_000)),
            description: "This is a sample product description with detailed information \
                          about the features and specifications."
                .to_string(),
            rating: random_rating(rng),
            review_count: rng.random_range(50..1_050),
            images: (1..=3)
                .map(|i| format!("https://picsum.photos/600/600?random={i}"))
                .collect(),
            specifications: vec![
                Specification::new("Brand", "Sample Brand"),
                Specification::new("Model", "Sample Model"),
                Specification::new("Color", "Black"),
                Specification::new("Warranty", "1 Year"),
                Specification::new("Source URL", url),
            ],
            source: ListingSource::Mock,
            is_mock: true,
        })
    }
}

/// Rating in [3.0, 5.0] with one decimal.
fn random_rating(rng: &mut StdRng) -> f64 {
    f64::from(rng.random_range(30u32..=50)) / 10.0
}
