//! Sliding-window rate limiting per client

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use tracing::debug;
use tracing::warn;

/// Default request budget: 30 requests per 60 seconds
pub const DEFAULT_MAX_REQUESTS: usize = 30;
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;

/// In-memory sliding-window rate limiter.
///
/// Each client id keeps the timestamps of its requests within the trailing
/// window. The check-and-record step runs under the entry's lock, so two
/// concurrent requests cannot both take the last remaining slot. Idle
/// clients are reclaimed by [`RateLimiter::sweep_idle`].
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: Arc<DashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Arc::new(DashMap::new()),
        }
    }

    /// Admit the request and record it, or reject without recording when the
    /// client already used its budget for the trailing window
    pub fn is_allowed(&self, client_id: &str) -> bool {
        self.is_allowed_at(client_id, Instant::now())
    }

    fn is_allowed_at(&self, client_id: &str, now: Instant) -> bool {
        let mut entry = self.requests.entry(client_id.to_string()).or_default();

        // Prune requests that fell out of the window
        let cutoff = now.checked_sub(self.window);
        entry.retain(|&t| cutoff.map_or(true, |c| t > c));

        if entry.len() >= self.max_requests {
            warn!("Rate limit exceeded for {}", client_id);
            return false;
        }

        entry.push(now);
        true
    }

    /// Drop clients whose most recent request fell out of the window
    pub fn sweep_idle(&self) {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);
        let before = self.requests.len();
        self.requests.retain(|_, timestamps| {
            timestamps
                .last()
                .map_or(false, |&t| cutoff.map_or(true, |c| t > c))
        });
        let swept = before - self.requests.len();
        if swept > 0 {
            debug!("Swept {} idle rate-limit client(s)", swept);
        }
    }

    /// Start the background sweep reclaiming idle client entries
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                limiter.sweep_idle();
            }
        });
    }

    pub fn client_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_REQUESTS,
            Duration::from_secs(DEFAULT_WINDOW_SECONDS),
        )
    }
}
