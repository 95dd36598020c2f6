use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::IndexedRandom;

/// Browser identities presented to the marketplaces.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
];

/// Rotates the outbound user-agent so consecutive fetches do not present
/// an identical fingerprint. Not a security boundary.
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    pool: Arc<[String]>,
    cursor: Arc<AtomicUsize>,
}

impl Default for IdentityRotator {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect())
    }
}

impl IdentityRotator {
    /// Build a rotator over `pool`. An empty pool falls back to the defaults.
    pub fn new(pool: Vec<String>) -> Self {
        let pool = if pool.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            pool
        };
        Self {
            pool: pool.into(),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Round-robin pick; wraps at the end of the pool.
    pub fn next(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        &self.pool[index]
    }

    /// Uniform random pick.
    pub fn random(&self) -> &str {
        self.pool
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }
}
