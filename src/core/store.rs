//! Storage abstractions shared by every engine component.

use uuid::Uuid;

use crate::core::{
    Application, EngineError, NewParticipant, Participant, ParticipantId, ParticipantState, Queue,
    Transition,
};

/// Durable participant records. The only shared mutable resource.
///
/// Every method must be atomic with respect to every other method; in
/// particular [`ParticipantStore::transition`] is a single compare-and-set,
/// never a read followed by a separate write.
pub trait ParticipantStore: Send + Sync + 'static {
    /// Persist a new waiting participant and assign its id.
    ///
    /// Fails with [`EngineError::DuplicateToken`] if the token is already in
    /// use by any participant, deleted or not.
    fn insert(&self, participant: NewParticipant) -> Result<Participant, EngineError>;

    /// Fetch by id, including soft-deleted records.
    fn get(&self, id: ParticipantId) -> Result<Option<Participant>, EngineError>;

    /// Fetch a non-deleted participant by token.
    fn find_by_token(&self, token: &str) -> Result<Option<Participant>, EngineError>;

    /// Oldest waiting participants of a queue, at most `limit`, ordered by
    /// creation time then insertion order.
    fn select_waiting(&self, queue_id: Uuid, limit: usize)
        -> Result<Vec<Participant>, EngineError>;

    /// Number of waiting participants in a queue.
    fn count_waiting(&self, queue_id: Uuid) -> Result<usize, EngineError>;

    /// Waiting participants whose expiry is strictly before `now_ms`.
    fn select_expired(&self, now_ms: u128) -> Result<Vec<Participant>, EngineError>;

    /// Apply `transition` only if the participant is still waiting.
    ///
    /// Returns the updated record, or [`EngineError::StoreConflict`] if the
    /// participant is already terminal or deleted, or
    /// [`EngineError::TokenNotFound`] if the id is unknown.
    fn transition(
        &self,
        id: ParticipantId,
        transition: Transition,
    ) -> Result<Participant, EngineError>;

    /// Page through a queue's non-deleted participants in admission order.
    fn list(
        &self,
        queue_id: Uuid,
        state: Option<ParticipantState>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Participant>, EngineError>;
}

/// Read-only view of provisioned applications and queues.
pub trait TenantDirectory: Send + Sync + 'static {
    /// Active, non-deleted application holding `credential`.
    fn application_by_credential(&self, credential: &str) -> Option<Application>;

    /// Application by id, regardless of active flag.
    fn application(&self, id: Uuid) -> Option<Application>;

    /// Active, non-deleted queue `queue_id` owned by `application_id`.
    fn queue_for_application(&self, application_id: Uuid, queue_id: Uuid) -> Option<Queue>;

    /// Every active, non-deleted queue.
    fn active_queues(&self) -> Vec<Queue>;
}
