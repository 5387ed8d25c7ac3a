//! Builder that wires configuration and backends into a [`WaitingRoom`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::core::{
    AdmissionController, AdmissionRateLimiter, CallbackDispatcher, CallbackTransport, DeliveryLog,
    EngineError, ExpirationSweeper, InMemoryDeliveryLog, OperatorNotifier, ParticipantStore,
    ReleaseScheduler, Spawn, TenantDirectory, WaitingRoom,
};
use crate::infra::{HttpCallbackTransport, InMemoryDirectory, InMemoryParticipantStore, LogNotifier};
use crate::util::clock::{Clock, SystemClock};
use crate::util::metrics::EngineMetrics;

/// Records kept by the default in-memory delivery log.
const DEFAULT_DELIVERY_LOG_CAPACITY: usize = 10_000;

/// Assembles a [`WaitingRoom`]; unset backends fall back to in-memory ones,
/// the HTTP transport, the system clock and the logging notifier.
pub struct WaitingRoomBuilder<S> {
    config: EngineConfig,
    spawner: S,
    directory: Option<Arc<dyn TenantDirectory>>,
    store: Option<Arc<dyn ParticipantStore>>,
    transport: Option<Arc<dyn CallbackTransport>>,
    delivery_log: Option<Arc<dyn DeliveryLog>>,
    notifier: Option<Arc<dyn OperatorNotifier>>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Arc<EngineMetrics>>,
}

impl<S> WaitingRoomBuilder<S>
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Start from a configuration and a spawner.
    pub fn new(config: EngineConfig, spawner: S) -> Self {
        Self {
            config,
            spawner,
            directory: None,
            store: None,
            transport: None,
            delivery_log: None,
            notifier: None,
            clock: None,
            metrics: None,
        }
    }

    /// Use a tenant directory.
    pub fn directory(mut self, directory: Arc<dyn TenantDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Use a participant store.
    pub fn store(mut self, store: Arc<dyn ParticipantStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a callback transport.
    pub fn transport(mut self, transport: Arc<dyn CallbackTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a delivery failure log.
    pub fn delivery_log(mut self, log: Arc<dyn DeliveryLog>) -> Self {
        self.delivery_log = Some(log);
        self
    }

    /// Use an operator notifier.
    pub fn notifier(mut self, notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use a clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Record into existing metrics.
    pub fn metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate configuration and assemble the room.
    pub fn build(self) -> Result<WaitingRoom<S>, EngineError> {
        let cfg = self.config;
        cfg.validate()
            .map_err(|e| EngineError::Backend(format!("config invalid: {e}")))?;

        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(InMemoryDirectory::new()));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryParticipantStore::new()));
        let transport: Arc<dyn CallbackTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpCallbackTransport::new(cfg.callback_timeout())?),
        };
        let delivery_log = self
            .delivery_log
            .unwrap_or_else(|| Arc::new(InMemoryDeliveryLog::new(DEFAULT_DELIVERY_LOG_CAPACITY)));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let metrics = self.metrics.unwrap_or_default();
        let shutdown = CancellationToken::new();

        let dispatcher = CallbackDispatcher::new(
            transport,
            cfg.callback.retry_policy(),
            delivery_log,
            Arc::clone(&metrics),
            shutdown.clone(),
        )
        .with_notifier(Arc::clone(&notifier));

        let admission = AdmissionController::new(
            Arc::clone(&directory),
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&metrics),
            cfg.admission_window(),
            cfg.simulation_window(),
        );
        let scheduler = ReleaseScheduler::new(
            Arc::clone(&store),
            directory,
            Arc::new(dispatcher),
            Arc::clone(&clock),
            Arc::clone(&metrics),
            self.spawner.clone(),
        )
        .with_dispatch_mode(cfg.dispatch)
        .with_depth_alert(notifier, cfg.queue_alert_threshold);
        let sweeper =
            ExpirationSweeper::new(Arc::clone(&store), Arc::clone(&clock), Arc::clone(&metrics));
        let rate_limiter = AdmissionRateLimiter::new(
            cfg.rate_limit.max_requests,
            cfg.rate_limit_window(),
            clock,
        );

        Ok(WaitingRoom::new(
            admission,
            scheduler,
            sweeper,
            rate_limiter,
            store,
            metrics,
            cfg.release_interval(),
            cfg.expiry_interval(),
            shutdown,
            self.spawner,
        ))
    }
}

/// Build a room from configuration with default backends.
pub fn build_waiting_room<S>(cfg: EngineConfig, spawner: S) -> Result<WaitingRoom<S>, EngineError>
where
    S: Spawn + Clone + Send + Sync + 'static,
{
    WaitingRoomBuilder::new(cfg, spawner).build()
}
