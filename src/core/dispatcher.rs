//! Release callback delivery with bounded retries.
//!
//! The dispatcher runs after a participant has already been moved to
//! `ready`; nothing it does (success, exhaustion, or cancellation on
//! shutdown) feeds back into participant state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::audit::{build_delivery_record, DeliveryLog};
use crate::core::{Application, EngineError, Participant, ParticipantId, ParticipantState, Queue};
use crate::util::metrics::EngineMetrics;

/// JSON body POSTed to the application's callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    /// Participant bearer token.
    pub token: String,
    /// Caller-supplied visitor identifier.
    pub visitor_id: String,
    /// Queue the participant was released from.
    pub queue_id: String,
    /// Resulting participant state.
    pub status: ParticipantState,
    /// Wait duration in seconds.
    pub wait_time: Option<u64>,
    /// Opaque redirect hint.
    pub redirect_url: Option<String>,
}

impl CallbackPayload {
    /// Build the payload for a released participant.
    pub fn from_participant(participant: &Participant) -> Self {
        Self {
            token: participant.token.clone(),
            visitor_id: participant.visitor_id.clone(),
            queue_id: participant.queue_id.to_string(),
            status: participant.state,
            wait_time: participant.wait_secs(),
            redirect_url: participant.redirect_url.clone(),
        }
    }
}

/// Sends one callback request. Only a 2xx response counts as success.
#[async_trait]
pub trait CallbackTransport: Send + Sync + 'static {
    /// Deliver `payload` to `endpoint` once.
    async fn send(&self, endpoint: &str, payload: &CallbackPayload) -> Result<(), EngineError>;
}

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles for each later one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

/// Result of delivering one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Endpoint acknowledged on attempt `attempts`.
    Delivered {
        /// Attempts made.
        attempts: u32,
    },
    /// Every attempt failed; a delivery record was written.
    Failed {
        /// Attempts made.
        attempts: u32,
        /// Last failure reason.
        detail: String,
    },
    /// Shutdown interrupted delivery.
    Cancelled {
        /// Attempts started before cancellation.
        attempts: u32,
    },
}

/// Conditions an operator should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorAlert {
    /// A callback exhausted every attempt.
    CallbackFailure {
        /// Owning application.
        application_id: Uuid,
        /// Queue released from.
        queue_id: Uuid,
        /// Participant whose callback failed.
        participant_id: ParticipantId,
        /// Last failure reason.
        detail: String,
    },
    /// A queue is still deep after a release cycle.
    QueueDepth {
        /// Queue identifier.
        queue_id: Uuid,
        /// Queue display name.
        queue_name: String,
        /// Waiting participants.
        depth: usize,
        /// Configured alert threshold.
        threshold: usize,
    },
}

/// Outbound alert channel (email, chat webhook, pager...).
#[async_trait]
pub trait OperatorNotifier: Send + Sync + 'static {
    /// Deliver an alert. Failures are the notifier's own concern.
    async fn notify(&self, alert: OperatorAlert);
}

enum Attempt {
    Sent(Result<(), EngineError>),
    Shutdown,
}

/// Delivers release notifications to application endpoints.
pub struct CallbackDispatcher {
    transport: Arc<dyn CallbackTransport>,
    policy: RetryPolicy,
    log: Arc<dyn DeliveryLog>,
    metrics: Arc<EngineMetrics>,
    notifier: Option<Arc<dyn OperatorNotifier>>,
    shutdown: CancellationToken,
}

impl CallbackDispatcher {
    /// Create a dispatcher.
    pub fn new(
        transport: Arc<dyn CallbackTransport>,
        policy: RetryPolicy,
        log: Arc<dyn DeliveryLog>,
        metrics: Arc<EngineMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            transport,
            policy,
            log,
            metrics,
            notifier: None,
            shutdown,
        }
    }

    /// Attach an operator notifier for exhausted callbacks.
    pub fn with_notifier(mut self, notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Retry policy in use.
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Deliver the release notification for `participant`.
    pub async fn deliver(
        &self,
        participant: &Participant,
        queue: &Queue,
        application: &Application,
    ) -> DeliveryOutcome {
        let payload = CallbackPayload::from_participant(participant);
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0;

        let outcome = loop {
            if self.shutdown.is_cancelled() {
                break DeliveryOutcome::Cancelled { attempts };
            }
            attempts += 1;
            let attempt = tokio::select! {
                () = self.shutdown.cancelled() => Attempt::Shutdown,
                result = self.transport.send(&application.callback_url, &payload) => Attempt::Sent(result),
            };
            let err = match attempt {
                Attempt::Shutdown => break DeliveryOutcome::Cancelled { attempts },
                Attempt::Sent(Ok(())) => break DeliveryOutcome::Delivered { attempts },
                Attempt::Sent(Err(err)) => err,
            };
            tracing::warn!(
                participant = participant.id,
                queue = %queue.id,
                attempt = attempts,
                error = %err,
                "callback attempt failed"
            );
            if attempts >= max_attempts {
                break DeliveryOutcome::Failed {
                    attempts,
                    detail: err.to_string(),
                };
            }
            let delay = self.policy.delay_after(attempts);
            let slept = tokio::select! {
                () = self.shutdown.cancelled() => false,
                () = tokio::time::sleep(delay) => true,
            };
            if !slept {
                break DeliveryOutcome::Cancelled { attempts };
            }
        };

        self.metrics.observe_callback_duration(started.elapsed());
        match &outcome {
            DeliveryOutcome::Delivered { attempts } => {
                self.metrics.record_callback_success();
                tracing::debug!(participant = participant.id, attempts, "callback delivered");
            }
            DeliveryOutcome::Failed { attempts, detail } => {
                self.metrics.record_callback_failure();
                self.log.record(build_delivery_record(
                    application.id,
                    queue.id,
                    participant.id,
                    *attempts,
                    format!(
                        "Participant: {}, Queue: {}, App: {}, Error: {detail}",
                        participant.id, queue.id, application.id
                    ),
                ));
                tracing::error!(
                    participant = participant.id,
                    queue = %queue.id,
                    application = %application.id,
                    attempts,
                    "callback failed after all attempts"
                );
                if let Some(notifier) = &self.notifier {
                    notifier
                        .notify(OperatorAlert::CallbackFailure {
                            application_id: application.id,
                            queue_id: queue.id,
                            participant_id: participant.id,
                            detail: detail.clone(),
                        })
                        .await;
                }
            }
            DeliveryOutcome::Cancelled { attempts } => {
                tracing::info!(
                    participant = participant.id,
                    attempts,
                    "callback delivery cancelled by shutdown"
                );
            }
        }
        outcome
    }
}
