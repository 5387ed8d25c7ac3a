//! Tests for tokio spawner utilities

use waitroom::core::Spawn;
use waitroom::runtime::tokio_spawner::TokioSpawner;
use waitroom::runtime::{health, ClientIdentity};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_tokio_spawner_current() {
    let spawner = TokioSpawner::current();
    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send("done").unwrap();
    });
    assert_eq!(rx.await.unwrap(), "done");
}

#[test]
fn test_health_is_ok() {
    assert!(health().ok);
}

#[test]
fn test_client_key_from_forwarded_header() {
    let client = ClientIdentity {
        credential: None,
        forwarded_for: Some("203.0.113.9, 10.0.0.1".into()),
        peer_addr: None,
    };
    assert_eq!(client.client_key(), "ip:203.0.113.9");
}
