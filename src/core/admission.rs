//! Admission controller: validates join requests and creates waiting participants.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::core::{
    Application, EngineError, NewParticipant, Participant, ParticipantState, ParticipantStore,
    Queue, TenantDirectory,
};
use crate::util::clock::Clock;
use crate::util::metrics::EngineMetrics;
use crate::util::token::generate_token;

/// Id carried by simulated participants; stores never assign it.
pub const SIMULATED_PARTICIPANT_ID: u64 = 0;

/// Creates participants after checking tenant credentials and queue ownership.
pub struct AdmissionController {
    directory: Arc<dyn TenantDirectory>,
    store: Arc<dyn ParticipantStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
    admission_window: Duration,
    simulation_window: Duration,
}

impl AdmissionController {
    /// Create a controller.
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        store: Arc<dyn ParticipantStore>,
        clock: Arc<dyn Clock>,
        metrics: Arc<EngineMetrics>,
        admission_window: Duration,
        simulation_window: Duration,
    ) -> Self {
        Self {
            directory,
            store,
            clock,
            metrics,
            admission_window,
            simulation_window,
        }
    }

    /// Resolve the credential and the queue it may address.
    ///
    /// The queue lookup is scoped to the resolved application, so a valid
    /// credential can never reach another tenant's queue.
    pub fn authorize(
        &self,
        credential: &str,
        queue_id: Uuid,
    ) -> Result<(Application, Queue), EngineError> {
        if credential.is_empty() {
            return Err(EngineError::InvalidCredential);
        }
        let app = self
            .directory
            .application_by_credential(credential)
            .ok_or(EngineError::InvalidCredential)?;
        let queue = self
            .directory
            .queue_for_application(app.id, queue_id)
            .ok_or(EngineError::QueueNotFound)?;
        Ok((app, queue))
    }

    /// Admit a visitor into a queue in the waiting state.
    pub fn admit(
        &self,
        credential: &str,
        queue_id: Uuid,
        visitor_id: &str,
    ) -> Result<Participant, EngineError> {
        self.admit_with_redirect(credential, queue_id, visitor_id, None)
    }

    /// Admit a visitor, attaching an opaque redirect hint for the callback.
    pub fn admit_with_redirect(
        &self,
        credential: &str,
        queue_id: Uuid,
        visitor_id: &str,
        redirect_url: Option<String>,
    ) -> Result<Participant, EngineError> {
        let (app, queue) = self.authorize(credential, queue_id)?;
        let now = self.clock.now_ms();
        let participant = self.store.insert(NewParticipant {
            queue_id: queue.id,
            visitor_id: visitor_id.to_string(),
            token: generate_token(),
            created_at_ms: now,
            expires_at_ms: now + self.admission_window.as_millis(),
            redirect_url,
        })?;
        self.metrics.record_admitted();
        tracing::info!(
            application = %app.id,
            queue = %queue.id,
            participant = participant.id,
            "participant admitted"
        );
        Ok(participant)
    }

    /// Validate like [`Self::admit`] but answer with an ephemeral ready
    /// participant. Nothing is persisted and no quota is consumed.
    pub fn simulate(
        &self,
        credential: &str,
        queue_id: Uuid,
        visitor_id: &str,
    ) -> Result<Participant, EngineError> {
        let (_, queue) = self.authorize(credential, queue_id)?;
        self.metrics.record_simulated();
        tracing::debug!(queue = %queue.id, "simulated admission");
        Ok(simulated_participant(
            queue.id,
            visitor_id,
            self.clock.now_ms(),
            self.simulation_window,
        ))
    }
}

/// Synthesize the response for a simulation-mode admission.
pub fn simulated_participant(
    queue_id: Uuid,
    visitor_id: &str,
    now_ms: u128,
    window: Duration,
) -> Participant {
    Participant {
        id: SIMULATED_PARTICIPANT_ID,
        queue_id,
        visitor_id: visitor_id.to_string(),
        token: generate_token(),
        state: ParticipantState::Ready,
        created_at_ms: now_ms,
        expires_at_ms: now_ms + window.as_millis(),
        wait_ms: Some(0),
        redirect_url: None,
        is_deleted: false,
    }
}
