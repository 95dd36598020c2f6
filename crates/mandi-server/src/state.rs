use std::time::Instant;

use mandi_core::ScrapeService;
use mandi_core::traits::{AlternateSource, Marketplace, RenderSession};

/// Shared application state, available to all route handlers via `State<Arc<AppState<..>>>`.
pub struct AppState<M, A, S>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession,
{
    pub service: ScrapeService<M, A, S>,
    /// Used to report uptime from the health endpoint.
    pub started_at: Instant,
}

impl<M, A, S> AppState<M, A, S>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession,
{
    pub fn new(service: ScrapeService<M, A, S>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}
