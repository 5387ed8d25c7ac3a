//! Benchmarks for the admission-and-release hot paths.
//!
//! Benchmarks cover:
//! - FIFO selection of waiting participants
//! - Full release cycles with inline dispatch
//! - Admission rate limiting across many clients

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use waitroom::config::DispatchMode;
use waitroom::core::{
    AdmissionRateLimiter, CallbackDispatcher, CallbackPayload, CallbackTransport, EngineError,
    InMemoryDeliveryLog, NewParticipant, ParticipantStore, ReleaseScheduler, RetryPolicy,
};
use waitroom::infra::{InMemoryDirectory, InMemoryParticipantStore};
use waitroom::runtime::TokioSpawner;
use waitroom::util::clock::ManualClock;
use waitroom::util::metrics::EngineMetrics;

// ============================================================================
// Fixtures
// ============================================================================

struct NoOpTransport;

#[async_trait]
impl CallbackTransport for NoOpTransport {
    async fn send(&self, _endpoint: &str, _payload: &CallbackPayload) -> Result<(), EngineError> {
        Ok(())
    }
}

fn filled_store(queue_id: Uuid, size: u64) -> InMemoryParticipantStore {
    let store = InMemoryParticipantStore::new();
    for i in 0..size {
        store
            .insert(NewParticipant {
                queue_id,
                visitor_id: format!("visitor-{i}"),
                token: format!("token-{queue_id}-{i}"),
                created_at_ms: u128::from(i),
                expires_at_ms: u128::from(i) + 600_000,
                redirect_url: None,
            })
            .unwrap();
    }
    store
}

// ============================================================================
// Store
// ============================================================================

fn bench_select_waiting(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_select_waiting");
    let queue_id = Uuid::new_v4();

    for size in [100_u64, 1_000, 10_000] {
        let store = filled_store(queue_id, size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(store.select_waiting(queue_id, 50).unwrap()));
        });
    }
    group.finish();
}

// ============================================================================
// Release cycle
// ============================================================================

fn bench_release_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("release_cycle");

    for quota in [10_u32, 100, 500] {
        group.throughput(Throughput::Elements(u64::from(quota)));
        group.bench_with_input(BenchmarkId::from_parameter(quota), &quota, |b, &quota| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let directory = Arc::new(InMemoryDirectory::new());
                let app = directory.provision_application("bench", "bench-key", "http://bench/cb");
                let queue = directory.provision_queue(app.id, "main", quota);
                let store = Arc::new(filled_store(queue.id, u64::from(quota) * 2));
                let metrics = Arc::new(EngineMetrics::new());
                let dispatcher = CallbackDispatcher::new(
                    Arc::new(NoOpTransport),
                    RetryPolicy::default(),
                    Arc::new(InMemoryDeliveryLog::new(16)),
                    metrics.clone(),
                    CancellationToken::new(),
                );
                let scheduler = ReleaseScheduler::new(
                    store,
                    directory,
                    Arc::new(dispatcher),
                    Arc::new(ManualClock::new(1_000_000)),
                    metrics,
                    TokioSpawner::current(),
                )
                .with_dispatch_mode(DispatchMode::Inline);
                black_box(scheduler.run_cycle().await)
            });
        });
    }
    group.finish();
}

// ============================================================================
// Rate limiter
// ============================================================================

fn bench_rate_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_limiter_allowed");

    for clients in [10_usize, 1_000, 10_000] {
        let limiter = AdmissionRateLimiter::new(
            1_000,
            Duration::from_secs(60),
            Arc::new(ManualClock::new(0)),
        );
        let keys: Vec<String> = (0..clients).map(|i| format!("ip:10.0.{i}")).collect();
        let mut rng = rand::rng();
        group.bench_with_input(BenchmarkId::from_parameter(clients), &clients, |b, _| {
            b.iter(|| {
                let key = &keys[rng.random_range(0..keys.len())];
                black_box(limiter.allowed(key))
            });
        });
    }
    group.finish();
}

criterion_group!(store_benches, bench_select_waiting);
criterion_group!(release_benches, bench_release_cycle);
criterion_group!(limiter_benches, bench_rate_limiter);
criterion_main!(store_benches, release_benches, limiter_benches);
