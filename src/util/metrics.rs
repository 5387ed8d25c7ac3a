//! Operational counters for the admission-and-release engine.
//!
//! [`EngineMetrics`] is created once per process and handed to each component
//! that records into it. Every update is also forwarded to the `metrics`
//! facade so an installed recorder (Prometheus exporter, statsd, ...) can
//! publish it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ::metrics::{describe_counter, describe_gauge, describe_histogram};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Register all metric descriptions with the installed recorder.
///
/// Called once at startup after the recorder is installed.
pub fn describe_metrics() {
    describe_counter!("waitroom_participants_released_total", "Participants released to ready");
    describe_counter!("waitroom_participants_expired_total", "Participants expired while waiting");
    describe_counter!("waitroom_participants_admitted_total", "Participants admitted to a queue");
    describe_counter!("waitroom_callback_success_total", "Successful release callbacks");
    describe_counter!("waitroom_callback_failure_total", "Release callbacks that exhausted retries");
    describe_counter!("waitroom_rate_limited_total", "Admission requests rejected by the rate limiter");
    describe_gauge!("waitroom_queue_waiting", "Participants waiting per queue");
    describe_histogram!("waitroom_callback_duration_seconds", "Callback delivery duration including retries");
}

#[derive(Debug, Default)]
struct DurationStats {
    count: u64,
    total: Duration,
    max: Duration,
}

/// Process-owned counters, gauges and distributions.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    released: AtomicU64,
    expired: AtomicU64,
    admitted: AtomicU64,
    simulated: AtomicU64,
    cancelled: AtomicU64,
    rate_limited: AtomicU64,
    callback_success: AtomicU64,
    callback_failure: AtomicU64,
    queue_depth: Mutex<HashMap<Uuid, u64>>,
    callback_duration: Mutex<DurationStats>,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Participants moved from waiting to ready.
    pub released: u64,
    /// Participants moved from waiting to expired.
    pub expired: u64,
    /// Real admissions persisted.
    pub admitted: u64,
    /// Simulation admissions answered without persisting.
    pub simulated: u64,
    /// Participants cancelled by request.
    pub cancelled: u64,
    /// Admission requests rejected by the rate limiter.
    pub rate_limited: u64,
    /// Callbacks acknowledged with a 2xx response.
    pub callback_success: u64,
    /// Callbacks that exhausted every attempt.
    pub callback_failure: u64,
    /// Waiting depth per queue as of the last release cycle.
    pub queue_depth: HashMap<Uuid, u64>,
    /// Number of callback deliveries measured.
    pub callback_duration_count: u64,
    /// Sum of callback delivery durations in milliseconds.
    pub callback_duration_total_ms: u128,
    /// Longest callback delivery in milliseconds.
    pub callback_duration_max_ms: u128,
}

impl EngineMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `n` participants released.
    pub fn record_released(&self, n: u64) {
        self.released.fetch_add(n, Ordering::Relaxed);
        ::metrics::counter!("waitroom_participants_released_total").increment(n);
    }

    /// Count `n` participants expired.
    pub fn record_expired(&self, n: u64) {
        self.expired.fetch_add(n, Ordering::Relaxed);
        ::metrics::counter!("waitroom_participants_expired_total").increment(n);
    }

    /// Count one persisted admission.
    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("waitroom_participants_admitted_total", "mode" => "real").increment(1);
    }

    /// Count one simulation admission.
    pub fn record_simulated(&self) {
        self.simulated.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("waitroom_participants_admitted_total", "mode" => "simulation")
            .increment(1);
    }

    /// Count one cancellation.
    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one rate-limited admission request.
    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("waitroom_rate_limited_total").increment(1);
    }

    /// Count one successful callback.
    pub fn record_callback_success(&self) {
        self.callback_success.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("waitroom_callback_success_total").increment(1);
    }

    /// Count one callback that exhausted its attempts.
    pub fn record_callback_failure(&self) {
        self.callback_failure.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("waitroom_callback_failure_total").increment(1);
    }

    /// Observe the total time spent delivering one callback.
    pub fn observe_callback_duration(&self, elapsed: Duration) {
        {
            let mut stats = self.callback_duration.lock();
            stats.count += 1;
            stats.total += elapsed;
            stats.max = stats.max.max(elapsed);
        }
        ::metrics::histogram!("waitroom_callback_duration_seconds").record(elapsed.as_secs_f64());
    }

    /// Set the waiting-depth gauge for a queue.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_queue_depth(&self, queue_id: Uuid, depth: u64) {
        self.queue_depth.lock().insert(queue_id, depth);
        ::metrics::gauge!("waitroom_queue_waiting", "queue_id" => queue_id.to_string())
            .set(depth as f64);
    }

    /// Last recorded waiting depth for a queue.
    pub fn queue_depth(&self, queue_id: Uuid) -> Option<u64> {
        self.queue_depth.lock().get(&queue_id).copied()
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let durations = self.callback_duration.lock();
        MetricsSnapshot {
            released: self.released.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            simulated: self.simulated.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            callback_success: self.callback_success.load(Ordering::Relaxed),
            callback_failure: self.callback_failure.load(Ordering::Relaxed),
            queue_depth: self.queue_depth.lock().clone(),
            callback_duration_count: durations.count,
            callback_duration_total_ms: durations.total.as_millis(),
            callback_duration_max_ms: durations.max.as_millis(),
        }
    }
}
