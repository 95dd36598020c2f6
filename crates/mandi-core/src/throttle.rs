//! Process-wide request throttling.
//!
//! A single [`Throttle`] is shared by every marketplace, by detail lookups and
//! by the alternate API client. It is a global minimum-spacing gate, not a
//! concurrency cap: concurrent callers queue on a fair async mutex and leave
//! one at a time, each at least `delay` after the previous grant.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use mandi_core::throttle::{Throttle, ThrottleConfig, ThrottledFetcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! # use mandi_core::traits::Fetcher;
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str) -> Result<String, mandi_core::error::AppError> { todo!() }
//! # }
//! let throttle = Throttle::new(ThrottleConfig::new(Duration::from_secs(2)));
//! let fetcher = ThrottledFetcher::new(MyFetcher, throttle.clone());
//! let html = fetcher.fetch("https://www.amazon.in/s?k=laptop").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::status::StatusRegistry;
use crate::traits::Fetcher;

/// Configuration for the throttle.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum delay between any two consecutive grants.
    pub delay: Duration,

    /// Maximum random jitter added on top of `delay` (uniform [0, jitter)).
    ///
    /// Set to `Duration::ZERO` to disable.
    pub jitter: Duration,
}

impl ThrottleConfig {
    /// Create a new config with the given delay and no jitter.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    /// Add random jitter on top of the base delay.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Compute the effective delay for a single wait (delay + random jitter).
    fn effective_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(rand::rng().random_range(0..jitter_ms))
    }
}

impl Default for ThrottleConfig {
    /// 2 seconds, no jitter.
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

/// Global minimum-interval gate applied before every outbound request.
#[derive(Clone)]
pub struct Throttle {
    config: ThrottleConfig,
    /// Time of the previous grant. Held across the wait so callers leave in FIFO order.
    last_grant: Arc<Mutex<Option<Instant>>>,
    status: Option<StatusRegistry>,
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            last_grant: Arc::new(Mutex::new(None)),
            status: None,
        }
    }

    /// Publish every grant time into `status` as `lastRequestTimestamp`.
    pub fn with_status(mut self, status: StatusRegistry) -> Self {
        self.status = Some(status);
        self
    }

    /// Block until the configured delay has elapsed since the previous grant,
    /// then record a new grant.
    pub async fn await_slot(&self) {
        let mut last = self.last_grant.lock().await;

        if let Some(previous) = *last {
            let required = self.config.effective_delay();
            let elapsed = previous.elapsed();
            if elapsed < required {
                let sleep_duration = required - elapsed;
                tracing::debug!(sleep_ms = %sleep_duration.as_millis(), "Throttling request");
                tokio::time::sleep(sleep_duration).await;
            }
        }

        *last = Some(Instant::now());
        if let Some(status) = &self.status {
            status.record_request(Utc::now());
        }
    }
}

/// A [`Fetcher`] wrapper that waits for a throttle slot before every fetch.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    throttle: Throttle,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, throttle: Throttle) -> Self {
        Self { inner, throttle }
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.throttle.await_slot().await;
        self.inner.fetch(url).await
    }
}
