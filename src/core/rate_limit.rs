//! Sliding-window admission rate limiter.
//!
//! Gates inbound admission load per client key. Independent of the
//! per-queue release quota, which paces outbound releases.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::util::clock::Clock;

/// Per-client sliding-window counter held in process memory.
pub struct AdmissionRateLimiter {
    max_requests: usize,
    window_ms: u128,
    clock: Arc<dyn Clock>,
    hits: Mutex<HashMap<String, VecDeque<u128>>>,
}

impl AdmissionRateLimiter {
    /// Create a limiter allowing `max_requests` per `window` per client.
    pub fn new(max_requests: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window_ms: window.as_millis(),
            clock,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Drop hits that fell out of the trailing window.
    fn evict(hits: &mut VecDeque<u128>, now_ms: u128, window_ms: u128) {
        while hits
            .front()
            .is_some_and(|&t| now_ms.saturating_sub(t) >= window_ms)
        {
            hits.pop_front();
        }
    }

    /// Record an admission for `client_key` if under the ceiling.
    ///
    /// Rejected requests are not counted against the window.
    pub fn allowed(&self, client_key: &str) -> bool {
        let now = self.clock.now_ms();
        let mut all = self.hits.lock();
        let hits = all.entry(client_key.to_string()).or_default();
        Self::evict(hits, now, self.window_ms);
        if hits.len() < self.max_requests {
            hits.push_back(now);
            true
        } else {
            false
        }
    }

    /// Admissions left for `client_key` in the current window.
    pub fn remaining(&self, client_key: &str) -> usize {
        let now = self.clock.now_ms();
        let mut all = self.hits.lock();
        all.get_mut(client_key).map_or(self.max_requests, |hits| {
            Self::evict(hits, now, self.window_ms);
            self.max_requests.saturating_sub(hits.len())
        })
    }

    /// When the oldest counted hit leaves the window, ms since epoch.
    pub fn reset_at_ms(&self, client_key: &str) -> u128 {
        let now = self.clock.now_ms();
        self.hits
            .lock()
            .get(client_key)
            .and_then(|hits| hits.front().copied())
            .map_or(now + self.window_ms, |oldest| oldest + self.window_ms)
    }

    /// Configured ceiling.
    pub const fn limit(&self) -> usize {
        self.max_requests
    }

    /// Forget clients with no hits inside the window. Returns keys removed.
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now_ms();
        let mut all = self.hits.lock();
        let before = all.len();
        all.retain(|_, hits| {
            Self::evict(hits, now, self.window_ms);
            !hits.is_empty()
        });
        before - all.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.hits.lock().len()
    }
}
