//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{
    Listing, ListingSource, MarketplaceId, ProductDetails, Specification, placeholder_image,
};
use crate::traits::{AlternateSource, Fetcher, Marketplace, RenderSession};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs requested so far, in call order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.urls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockMarketplace
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MarketplaceCalls {
    search: usize,
    details: usize,
    last_query: Option<String>,
    last_limit: Option<usize>,
}

/// Mock marketplace with a fixed search answer, repeated on every call.
#[derive(Clone)]
pub struct MockMarketplace {
    id: MarketplaceId,
    search: Arc<Result<Vec<Listing>, AppError>>,
    details: Arc<Mutex<Option<Result<ProductDetails, AppError>>>>,
    panics: bool,
    calls: Arc<Mutex<MarketplaceCalls>>,
}

impl MockMarketplace {
    /// Marketplace that yields no listings and no details.
    pub fn new(id: MarketplaceId) -> Self {
        Self::build(id, Ok(Vec::new()), false)
    }

    pub fn with_listings(id: MarketplaceId, listings: Vec<Listing>) -> Self {
        Self::build(id, Ok(listings), false)
    }

    pub fn with_error(id: MarketplaceId, error: AppError) -> Self {
        Self::build(id, Err(error), false)
    }

    /// Marketplace whose search panics, for branch isolation tests.
    pub fn panicking(id: MarketplaceId) -> Self {
        Self::build(id, Ok(Vec::new()), true)
    }

    /// Answer for the next `details` call. Without one, `details` fails
    /// with `NotFound`.
    pub fn with_details(self, details: Result<ProductDetails, AppError>) -> Self {
        *self.details.lock().unwrap() = Some(details);
        self
    }

    fn build(id: MarketplaceId, search: Result<Vec<Listing>, AppError>, panics: bool) -> Self {
        Self {
            id,
            search: Arc::new(search),
            details: Arc::new(Mutex::new(None)),
            panics,
            calls: Arc::new(Mutex::new(MarketplaceCalls::default())),
        }
    }

    pub fn search_calls(&self) -> usize {
        self.calls.lock().unwrap().search
    }

    pub fn details_calls(&self) -> usize {
        self.calls.lock().unwrap().details
    }

    pub fn last_query(&self) -> Option<String> {
        self.calls.lock().unwrap().last_query.clone()
    }

    pub fn last_limit(&self) -> Option<usize> {
        self.calls.lock().unwrap().last_limit
    }
}

impl Marketplace for MockMarketplace {
    fn id(&self) -> MarketplaceId {
        self.id
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Listing>, AppError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.search += 1;
            calls.last_query = Some(query.to_string());
            calls.last_limit = Some(limit);
        }
        if self.panics {
            panic!("mock marketplace {} blew up", self.id);
        }
        match self.search.as_ref() {
            Ok(listings) => Ok(listings.clone()),
            Err(e) => Err(e.clone()),
        }
    }

    async fn details(&self, url: &str) -> Result<ProductDetails, AppError> {
        self.calls.lock().unwrap().details += 1;
        self.details
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(AppError::NotFound(format!("no details for {url}"))))
    }
}

// ---------------------------------------------------------------------------
// MockAlternate
// ---------------------------------------------------------------------------

/// Mock alternate API with a fixed answer, repeated on every call.
#[derive(Clone)]
pub struct MockAlternate {
    answer: Arc<Result<Vec<Listing>, AppError>>,
    calls: Arc<AtomicUsize>,
}

impl MockAlternate {
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            answer: Arc::new(Ok(listings)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: AppError) -> Self {
        Self {
            answer: Arc::new(Err(error)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AlternateSource for MockAlternate {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Listing>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer.as_ref() {
            Ok(listings) => Ok(listings.iter().take(limit).cloned().collect()),
            Err(e) => Err(e.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSession
// ---------------------------------------------------------------------------

/// Mock render session that records launch/close and can fail to launch.
#[derive(Clone, Default)]
pub struct MockSession {
    connected: Arc<AtomicBool>,
    fail_launch: bool,
    pub closed: Arc<AtomicUsize>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RenderSession for MockSession {
    async fn launch(&self) -> Result<(), AppError> {
        if self.fail_launch {
            return Err(AppError::Generic("browser binary not found".into()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        self.connected.store(false, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a live-looking listing for testing.
pub fn make_listing(id: &str, name: &str, price: f64, source: ListingSource) -> Listing {
    Listing {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image: placeholder_image(0),
        rating: 4.2,
        review_count: 128,
        url: "https://www.amazon.in/dp/B0TEST0001".to_string(),
        source,
        in_stock: true,
        is_mock: false,
    }
}

/// Create a live-looking detail record for testing.
pub fn make_details(name: &str, price: f64, source: ListingSource) -> ProductDetails {
    ProductDetails {
        name: name.to_string(),
        price,
        description: "Test product description".to_string(),
        rating: 4.5,
        review_count: 2_311,
        images: vec![placeholder_image(0)],
        specifications: vec![Specification::new("Brand", "Test Brand")],
        source,
        is_mock: false,
    }
}
