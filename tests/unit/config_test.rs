//! Tests for configuration validation and loading

use std::collections::HashMap;
use std::time::Duration;

use waitroom::config::{DispatchMode, EngineConfig};

#[test]
fn test_engine_config_defaults() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.release_interval(), Duration::from_secs(60));
    assert_eq!(cfg.expiry_interval(), Duration::from_secs(60));
    assert_eq!(cfg.admission_window(), Duration::from_secs(600));
    assert_eq!(cfg.simulation_window(), Duration::from_secs(300));
    assert_eq!(cfg.queue_alert_threshold, 100);
    assert_eq!(cfg.dispatch, DispatchMode::Inline);
    assert_eq!(cfg.callback.max_attempts, 3);
    assert_eq!(cfg.callback.retry_policy().base_delay, Duration::from_secs(1));
    assert_eq!(cfg.rate_limit.max_requests, 1000);
    assert_eq!(cfg.rate_limit_window(), Duration::from_secs(60));
}

#[test]
fn test_engine_config_rejects_zero_intervals() {
    let cfg = EngineConfig {
        release_interval_secs: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = EngineConfig {
        admission_window_secs: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_engine_config_rejects_zero_attempts() {
    let mut cfg = EngineConfig::default();
    cfg.callback.max_attempts = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_engine_config_rejects_zero_rate_limit() {
    let mut cfg = EngineConfig::default();
    cfg.rate_limit.max_requests = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_engine_config_from_json_partial() {
    let cfg = EngineConfig::from_json_str(
        r#"{"release_interval_secs": 5, "dispatch": "spawned", "callback": {"max_attempts": 5}}"#,
    )
    .unwrap();
    assert_eq!(cfg.release_interval_secs, 5);
    assert_eq!(cfg.dispatch, DispatchMode::Spawned);
    assert_eq!(cfg.callback.max_attempts, 5);
    assert_eq!(cfg.callback.base_delay_ms, 1000);
    assert_eq!(cfg.expiry_interval_secs, 60);
}

#[test]
fn test_engine_config_from_json_invalid() {
    assert!(EngineConfig::from_json_str("not json").is_err());
    assert!(EngineConfig::from_json_str(r#"{"expiry_interval_secs": 0}"#).is_err());
}

#[test]
fn test_engine_config_from_lookup_overrides() {
    let vars: HashMap<&str, &str> = [
        ("WAITROOM_RELEASE_INTERVAL_SECS", "10"),
        ("RATE_LIMIT_PER_MINUTE", "5"),
        ("QUEUE_THRESHOLD", "20"),
        ("WAITROOM_CALLBACK_BASE_DELAY_MS", "250"),
    ]
    .into_iter()
    .collect();
    let cfg = EngineConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();

    assert_eq!(cfg.release_interval_secs, 10);
    assert_eq!(cfg.rate_limit.max_requests, 5);
    assert_eq!(cfg.queue_alert_threshold, 20);
    assert_eq!(cfg.callback.base_delay_ms, 250);
    assert_eq!(cfg.expiry_interval_secs, 60);
}

#[test]
fn test_engine_config_from_lookup_rejects_garbage() {
    let result = EngineConfig::from_lookup(|key| {
        (key == "WAITROOM_EXPIRY_INTERVAL_SECS").then(|| "soon".to_string())
    });
    assert!(result.is_err());

    let result = EngineConfig::from_lookup(|key| {
        (key == "WAITROOM_RELEASE_INTERVAL_SECS").then(|| "0".to_string())
    });
    assert!(result.is_err());
}
