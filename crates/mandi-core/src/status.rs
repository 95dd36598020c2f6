//! Process-wide scraper flags shared across concurrent request flows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::models::ScraperStatus;

#[derive(Debug)]
struct StatusInner {
    initialized: AtomicBool,
    scraping_enabled: AtomicBool,
    source_connected: AtomicBool,
    last_request: Mutex<Option<DateTime<Utc>>>,
}

/// Shared, cheaply cloneable handle to the scraper's health flags.
///
/// `scraping_enabled` is read fresh on every ladder run, so toggling it takes
/// effect for the next request without any caching.
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    inner: Arc<StatusInner>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StatusRegistry {
    pub fn new(scraping_enabled: bool) -> Self {
        Self {
            inner: Arc::new(StatusInner {
                initialized: AtomicBool::new(false),
                scraping_enabled: AtomicBool::new(scraping_enabled),
                source_connected: AtomicBool::new(false),
                last_request: Mutex::new(None),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.scraping_enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.inner.scraping_enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(enabled, "Web scraping {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.inner.initialized.store(initialized, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    pub fn set_source_connected(&self, connected: bool) {
        self.inner.source_connected.store(connected, Ordering::SeqCst);
    }

    /// Record the wall-clock time of the most recent throttle grant.
    pub fn record_request(&self, at: DateTime<Utc>) {
        *self.lock_last_request() = Some(at);
    }

    pub fn snapshot(&self) -> ScraperStatus {
        ScraperStatus {
            initialized: self.inner.initialized.load(Ordering::SeqCst),
            scraping_enabled: self.inner.scraping_enabled.load(Ordering::SeqCst),
            source_connected: self.inner.source_connected.load(Ordering::SeqCst),
            last_request_timestamp: *self.lock_last_request(),
        }
    }

    fn lock_last_request(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        self.inner
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
