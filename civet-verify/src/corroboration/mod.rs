//! Corroboration Clients (Layers 2 & 3)
//!
//! **[CVT-COR-010]** Each client wraps one unreliable, rate-limited
//! external evidence source behind the `CorroborationSource` trait. A call
//! that cannot produce evidence fails with `CorroborationError`; clients
//! never fabricate a verdict, and the orchestrator treats failure as
//! "layer did not execute".
//!
//! Transports are injectable so unit tests run against canned payloads
//! with no network.

pub mod ai_search;
pub mod classifier;
pub mod official_lookup;
pub mod registry;

pub use ai_search::AiSearchClient;
pub use official_lookup::OfficialSourceClient;
pub use registry::SourceRegistry;

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Minimum spacing between calls to one upstream source
///
/// Both corroboration targets are independently rate-limited; one request
/// per second keeps the engine well under every published limit.
pub(crate) const RATE_LIMIT_MS: u64 = 1_000;

/// Rate limiter enforcing a minimum interval between requests
pub(crate) struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub(crate) fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    pub(crate) async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
