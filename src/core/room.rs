//! The waiting room: admission, lookup, cancellation and the two periodic loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{
    AdmissionController, AdmissionRateLimiter, CycleReport, EngineError, ExpirationSweeper,
    Participant, ParticipantState, ParticipantStore, ReleaseScheduler, Spawn, Transition,
};
use crate::util::metrics::{EngineMetrics, MetricsSnapshot};

/// Composed admission-and-release engine.
///
/// Request-driven operations (`admit`, `status`, `cancel`) may run
/// concurrently with the release and expiry loops; all of them coordinate
/// only through the participant store.
pub struct WaitingRoom<S> {
    admission: AdmissionController,
    scheduler: Arc<ReleaseScheduler<S>>,
    sweeper: Arc<ExpirationSweeper>,
    rate_limiter: Arc<AdmissionRateLimiter>,
    store: Arc<dyn ParticipantStore>,
    metrics: Arc<EngineMetrics>,
    release_interval: Duration,
    expiry_interval: Duration,
    shutdown: CancellationToken,
    started: AtomicBool,
    spawner: S,
}

impl<S> WaitingRoom<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Assemble a room from its components.
    ///
    /// `shutdown` must be the token the dispatcher inside `scheduler` watches.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        admission: AdmissionController,
        scheduler: ReleaseScheduler<S>,
        sweeper: ExpirationSweeper,
        rate_limiter: AdmissionRateLimiter,
        store: Arc<dyn ParticipantStore>,
        metrics: Arc<EngineMetrics>,
        release_interval: Duration,
        expiry_interval: Duration,
        shutdown: CancellationToken,
        spawner: S,
    ) -> Self {
        Self {
            admission,
            scheduler: Arc::new(scheduler),
            sweeper: Arc::new(sweeper),
            rate_limiter: Arc::new(rate_limiter),
            store,
            metrics,
            release_interval,
            expiry_interval,
            shutdown,
            started: AtomicBool::new(false),
            spawner,
        }
    }

    /// Admit a visitor into a queue.
    pub fn admit(
        &self,
        credential: &str,
        queue_id: Uuid,
        visitor_id: &str,
        redirect_url: Option<String>,
    ) -> Result<Participant, EngineError> {
        self.admission
            .admit_with_redirect(credential, queue_id, visitor_id, redirect_url)
    }

    /// Simulation-mode admission; never persisted.
    pub fn simulate(
        &self,
        credential: &str,
        queue_id: Uuid,
        visitor_id: &str,
    ) -> Result<Participant, EngineError> {
        self.admission.simulate(credential, queue_id, visitor_id)
    }

    /// Current record for a token.
    pub fn status(&self, token: &str) -> Result<Participant, EngineError> {
        self.store
            .find_by_token(token)?
            .ok_or(EngineError::TokenNotFound)
    }

    /// Cancel a waiting participant.
    ///
    /// Unknown, cancelled and already-terminal tokens all fail with
    /// [`EngineError::TokenNotFound`] and leave the record untouched.
    pub fn cancel(&self, token: &str) -> Result<Participant, EngineError> {
        let participant = self.status(token)?;
        match self.store.transition(participant.id, Transition::Cancel) {
            Ok(cancelled) => {
                self.metrics.record_cancelled();
                tracing::info!(participant = cancelled.id, "participant cancelled");
                Ok(cancelled)
            }
            Err(EngineError::StoreConflict) => Err(EngineError::TokenNotFound),
            Err(err) => Err(err),
        }
    }

    /// Page through a queue's participants on behalf of its owner.
    pub fn list(
        &self,
        credential: &str,
        queue_id: Uuid,
        state: Option<ParticipantState>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Participant>, EngineError> {
        let (_, queue) = self.admission.authorize(credential, queue_id)?;
        self.store.list(queue.id, state, skip, limit)
    }

    /// Admission rate limiter shared by the request surface.
    pub fn rate_limiter(&self) -> &AdmissionRateLimiter {
        &self.rate_limiter
    }

    /// Shared metrics.
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// Snapshot of the operational counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run one release cycle immediately.
    pub async fn run_release_cycle(&self) -> CycleReport {
        self.scheduler.run_cycle().await
    }

    /// Run one expiry cycle immediately.
    pub fn run_expiry_cycle(&self) -> Result<usize, EngineError> {
        self.sweeper.run_cycle()
    }

    /// Launch the release and expiry loops. Returns `false` if already started.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.spawner.spawn(release_loop(
            Arc::clone(&self.scheduler),
            self.release_interval,
            self.shutdown.clone(),
        ));
        self.spawner.spawn(expiry_loop(
            Arc::clone(&self.sweeper),
            Arc::clone(&self.rate_limiter),
            self.expiry_interval,
            self.shutdown.clone(),
        ));
        tracing::info!(
            release_interval_secs = self.release_interval.as_secs(),
            expiry_interval_secs = self.expiry_interval.as_secs(),
            "waiting room started"
        );
        true
    }

    /// Stop both loops and cancel in-flight callback retries.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        tracing::info!("waiting room shutting down");
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn release_loop<S>(
    scheduler: Arc<ReleaseScheduler<S>>,
    period: Duration,
    shutdown: CancellationToken,
) where
    S: Spawn + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let report = scheduler.run_cycle().await;
        tracing::debug!(
            released = report.released_total(),
            failed_queues = report.failed_queues.len(),
            "release cycle finished"
        );
    }
    tracing::info!("release loop stopped");
}

async fn expiry_loop(
    sweeper: Arc<ExpirationSweeper>,
    rate_limiter: Arc<AdmissionRateLimiter>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if let Err(err) = sweeper.run_cycle() {
            tracing::error!(error = %err, "expiry cycle failed");
        }
        let purged = rate_limiter.purge_idle();
        if purged > 0 {
            tracing::debug!(purged, "purged idle rate-limit clients");
        }
    }
    tracing::info!("expiry loop stopped");
}
