//! Tests for clock, token and metrics utilities

use std::time::Duration;

use uuid::Uuid;
use waitroom::util::clock::{now_ms, Clock, ManualClock, SystemClock};
use waitroom::util::metrics::EngineMetrics;
use waitroom::util::token::generate_token;

#[test]
fn test_system_clock_tracks_wall_time() {
    let before = now_ms();
    let observed = SystemClock.now_ms();
    assert!(observed >= before);
}

#[test]
fn test_manual_clock_advance_and_set() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);
    clock.advance(500);
    assert_eq!(clock.now_ms(), 1_500);
    clock.set(10);
    assert_eq!(clock.now_ms(), 10);
}

#[test]
fn test_manual_clock_clones_share_time() {
    let clock = ManualClock::new(0);
    let other = clock.clone();
    clock.advance(42);
    assert_eq!(other.now_ms(), 42);
}

#[test]
fn test_tokens_are_unique_and_url_safe() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_metrics_snapshot_counts() {
    let metrics = EngineMetrics::new();
    let queue = Uuid::new_v4();
    metrics.record_admitted();
    metrics.record_admitted();
    metrics.record_released(2);
    metrics.record_expired(1);
    metrics.record_cancelled();
    metrics.record_rate_limited();
    metrics.record_callback_success();
    metrics.record_callback_failure();
    metrics.observe_callback_duration(Duration::from_millis(300));
    metrics.observe_callback_duration(Duration::from_millis(100));
    metrics.set_queue_depth(queue, 7);

    let snap = metrics.snapshot();
    assert_eq!(snap.admitted, 2);
    assert_eq!(snap.released, 2);
    assert_eq!(snap.expired, 1);
    assert_eq!(snap.cancelled, 1);
    assert_eq!(snap.rate_limited, 1);
    assert_eq!(snap.callback_success, 1);
    assert_eq!(snap.callback_failure, 1);
    assert_eq!(snap.callback_duration_count, 2);
    assert_eq!(snap.callback_duration_total_ms, 400);
    assert_eq!(snap.callback_duration_max_ms, 300);
    assert_eq!(snap.queue_depth.get(&queue), Some(&7));
    assert_eq!(metrics.queue_depth(queue), Some(7));
}

#[test]
fn test_init_telemetry_is_idempotent() {
    waitroom::util::telemetry::init_telemetry();
    waitroom::util::telemetry::init_telemetry();
    assert!(tracing::dispatcher::has_been_set());
    tracing::info!(target: "waitroom", "telemetry initialized");
}
