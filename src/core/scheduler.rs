//! Release scheduler: paces participants from waiting to ready.
//!
//! Each cycle walks every live queue independently. A queue releases at most
//! its per-cycle quota, oldest participants first, and every release goes
//! through the store's conditional transition so overlapping cycles can never
//! release the same participant twice.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::DispatchMode;
use crate::core::{
    Application, CallbackDispatcher, EngineError, OperatorAlert, OperatorNotifier, Participant,
    ParticipantId, ParticipantStore, Queue, TenantDirectory, Transition,
};
use crate::util::clock::Clock;
use crate::util::metrics::EngineMetrics;

/// Abstraction for spawning background work on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// What one release cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Released participant ids per queue, in release order.
    pub released: HashMap<Uuid, Vec<ParticipantId>>,
    /// Queues whose processing failed this cycle.
    pub failed_queues: Vec<Uuid>,
}

impl CycleReport {
    /// Participants released across all queues.
    pub fn released_total(&self) -> usize {
        self.released.values().map(Vec::len).sum()
    }

    /// Participants released from one queue, in order.
    pub fn released_from(&self, queue_id: Uuid) -> &[ParticipantId] {
        self.released.get(&queue_id).map_or(&[], Vec::as_slice)
    }
}

/// Periodic release of waiting participants.
pub struct ReleaseScheduler<S> {
    store: Arc<dyn ParticipantStore>,
    directory: Arc<dyn TenantDirectory>,
    dispatcher: Arc<CallbackDispatcher>,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
    notifier: Option<Arc<dyn OperatorNotifier>>,
    alert_threshold: usize,
    mode: DispatchMode,
    spawner: S,
}

impl<S> ReleaseScheduler<S>
where
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler with inline dispatch and no alerting.
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        directory: Arc<dyn TenantDirectory>,
        dispatcher: Arc<CallbackDispatcher>,
        clock: Arc<dyn Clock>,
        metrics: Arc<EngineMetrics>,
        spawner: S,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
            clock,
            metrics,
            notifier: None,
            alert_threshold: 0,
            mode: DispatchMode::Inline,
            spawner,
        }
    }

    /// Select how released batches reach the dispatcher.
    pub const fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Raise a queue-depth alert when a queue still holds `threshold` or more
    /// waiting participants after release. `0` disables.
    pub fn with_depth_alert(mut self, notifier: Arc<dyn OperatorNotifier>, threshold: usize) -> Self {
        self.notifier = Some(notifier);
        self.alert_threshold = threshold;
        self
    }

    /// Run one cycle across every live queue.
    ///
    /// A failing queue is logged and recorded in the report; the remaining
    /// queues are still processed.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        for queue in self.directory.active_queues() {
            match self.process_queue(&queue).await {
                Ok(released) => {
                    if !released.is_empty() {
                        report.released.insert(queue.id, released);
                    }
                }
                Err(err) => {
                    tracing::error!(queue = %queue.id, error = %err, "failed to process queue");
                    report.failed_queues.push(queue.id);
                }
            }
        }
        report
    }

    /// Release up to the queue's quota, notify, and refresh its depth gauge.
    async fn process_queue(&self, queue: &Queue) -> Result<Vec<ParticipantId>, EngineError> {
        let application = self
            .directory
            .application(queue.application_id)
            .ok_or_else(|| {
                EngineError::Backend(format!("application {} not found", queue.application_id))
            })?;

        let quota = usize::try_from(queue.release_quota).unwrap_or(usize::MAX);
        let candidates = self.store.select_waiting(queue.id, quota)?;
        let now = self.clock.now_ms();

        let mut released = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let wait_ms = now.saturating_sub(candidate.created_at_ms);
            match self
                .store
                .transition(candidate.id, Transition::Release { wait_ms })
            {
                Ok(participant) => released.push(participant),
                Err(EngineError::StoreConflict) => {
                    tracing::debug!(participant = candidate.id, "already terminal, skipping release");
                }
                Err(err) => {
                    tracing::warn!(participant = candidate.id, error = %err, "release transition failed");
                }
            }
        }

        let ids: Vec<ParticipantId> = released.iter().map(|p| p.id).collect();
        if !released.is_empty() {
            self.metrics.record_released(released.len() as u64);
            tracing::info!(queue = %queue.id, released = released.len(), "released participants");
            self.dispatch(released, queue, application).await;
        }

        let depth = self.store.count_waiting(queue.id)?;
        self.metrics.set_queue_depth(queue.id, depth as u64);
        if let Some(notifier) = &self.notifier {
            if self.alert_threshold > 0 && depth >= self.alert_threshold {
                notifier
                    .notify(OperatorAlert::QueueDepth {
                        queue_id: queue.id,
                        queue_name: queue.name.clone(),
                        depth,
                        threshold: self.alert_threshold,
                    })
                    .await;
            }
        }
        Ok(ids)
    }

    /// Hand a released batch to the dispatcher, preserving release order.
    async fn dispatch(&self, released: Vec<Participant>, queue: &Queue, application: Application) {
        match self.mode {
            DispatchMode::Inline => {
                for participant in &released {
                    self.dispatcher.deliver(participant, queue, &application).await;
                }
            }
            DispatchMode::Spawned => {
                let dispatcher = Arc::clone(&self.dispatcher);
                let queue = queue.clone();
                self.spawner.spawn(async move {
                    for participant in &released {
                        dispatcher.deliver(participant, &queue, &application).await;
                    }
                });
            }
        }
    }
}
