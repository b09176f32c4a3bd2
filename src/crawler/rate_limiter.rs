//! Request rate limiting
//!
//! One [`RateLimiter`] is shared by every request of a run, the page fetch
//! included. It enforces a minimum interval between any two requests, no matter
//! how many workers are issuing them.
//!
//! # Example
//!
//! ```
//! use media_harvester::crawler::RateLimiter;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(Duration::from_millis(100));
//!
//! // First request proceeds immediately
//! limiter.acquire().await;
//!
//! // Second request waits until 100ms after the first one
//! limiter.acquire().await;
//! # }
//! ```

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Global rate limiter for one harvesting run
///
/// Each `acquire` reserves the next free slot (`max(now, last + interval)`) while
/// holding the mutex, then sleeps until that slot with the mutex released. The
/// read-compare-update step is therefore atomic across tasks, and waiting callers
/// never block each other from reserving.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between two requests
    interval: Duration,

    /// Slot handed out by the most recent `acquire` (`None` before the first one)
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with an explicit minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Minimum time between two requests
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the caller may issue its request
    ///
    /// The first call never waits. Every later call is scheduled at least
    /// `interval` after the slot of the previous call.
    ///
    /// # Returns
    ///
    /// The instant this request was scheduled for
    pub async fn acquire(&self) -> Instant {
        let slot = {
            let mut last_request = self.last_request.lock().await;
            let now = Instant::now();
            let slot = match *last_request {
                Some(previous) => std::cmp::max(now, previous + self.interval),
                None => now,
            };
            *last_request = Some(slot);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Rate limit: waiting {:?} before next request", wait);
            tokio::time::sleep_until(slot).await;
        }

        slot
    }
}
