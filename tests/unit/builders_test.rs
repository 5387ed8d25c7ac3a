//! Tests for builder modules

use std::sync::Arc;

use waitroom::builders::{build_waiting_room, WaitingRoomBuilder};
use waitroom::config::EngineConfig;
use waitroom::core::{EngineError, ParticipantState};
use waitroom::infra::InMemoryDirectory;
use waitroom::runtime::TokioSpawner;
use waitroom::util::clock::ManualClock;

#[tokio::test]
async fn test_build_waiting_room_defaults() {
    let room = build_waiting_room(EngineConfig::default(), TokioSpawner::current()).unwrap();
    assert!(!room.is_shutdown());
    assert_eq!(room.rate_limiter().limit(), 1000);
    assert_eq!(room.metrics_snapshot().admitted, 0);
}

#[tokio::test]
async fn test_builder_rejects_invalid_config() {
    let cfg = EngineConfig {
        expiry_interval_secs: 0,
        ..EngineConfig::default()
    };
    let err = WaitingRoomBuilder::new(cfg, TokioSpawner::current())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Backend(msg) if msg.starts_with("config invalid")));
}

#[tokio::test]
async fn test_builder_wires_directory_and_clock() {
    let directory = Arc::new(InMemoryDirectory::new());
    let app = directory.provision_application("shop", "key", "http://127.0.0.1:9/cb");
    let queue = directory.provision_queue(app.id, "checkout", 5);
    let clock = ManualClock::new(5_000);

    let mut cfg = EngineConfig::default();
    cfg.rate_limit.max_requests = 2;
    let room = WaitingRoomBuilder::new(cfg, TokioSpawner::current())
        .directory(directory)
        .clock(Arc::new(clock))
        .build()
        .unwrap();

    let participant = room.admit("key", queue.id, "visitor", None).unwrap();
    assert_eq!(participant.state, ParticipantState::Waiting);
    assert_eq!(participant.created_at_ms, 5_000);
    assert_eq!(participant.expires_at_ms, 605_000);
    assert_eq!(room.rate_limiter().limit(), 2);
}
