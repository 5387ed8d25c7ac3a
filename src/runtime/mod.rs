//! Runtime adapters and the transport-agnostic request surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{
    cancel, health, join, list_participants, metrics, queue_status, ApiError, ClientIdentity,
    Health, JoinMode, JoinOutcome, JoinRequest, ParticipantResponse, RateLimitInfo,
};
pub use tokio_spawner::TokioSpawner;
