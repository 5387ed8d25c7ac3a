//! Core admission-and-release abstractions.

pub mod admission;
pub mod audit;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod room;
pub mod scheduler;
pub mod store;
pub mod sweeper;

pub use admission::{simulated_participant, AdmissionController, SIMULATED_PARTICIPANT_ID};
pub use audit::{
    build_delivery_record, DeliveryAttemptRecord, DeliveryLog, InMemoryDeliveryLog,
    CALLBACK_FAILURE_EVENT,
};
pub use dispatcher::{
    CallbackDispatcher, CallbackPayload, CallbackTransport, DeliveryOutcome, OperatorAlert,
    OperatorNotifier, RetryPolicy,
};
pub use error::{AppResult, EngineError};
pub use model::{
    Application, NewParticipant, Participant, ParticipantId, ParticipantState, Queue, Transition,
};
pub use rate_limit::AdmissionRateLimiter;
pub use room::WaitingRoom;
pub use scheduler::{CycleReport, ReleaseScheduler, Spawn};
pub use store::{ParticipantStore, TenantDirectory};
pub use sweeper::ExpirationSweeper;
