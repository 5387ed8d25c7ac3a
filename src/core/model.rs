//! Tenant configuration records and the participant lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned participant identifier; increases with insertion order.
pub type ParticipantId = u64;

/// Tenant identity. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Opaque credential presented on admission.
    pub credential: String,
    /// Endpoint that receives release callbacks.
    pub callback_url: String,
    /// Inactive applications cannot admit.
    pub is_active: bool,
    /// Soft-deleted applications are invisible to the engine.
    pub is_deleted: bool,
}

/// Release configuration owned by one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    /// Queue identifier.
    pub id: Uuid,
    /// Owning application.
    pub application_id: Uuid,
    /// Display name.
    pub name: String,
    /// Maximum participants released per scheduling cycle.
    pub release_quota: u32,
    /// Sort hint for hosts; not enforced by the engine.
    pub priority: i32,
    /// Inactive queues are skipped by admission and release.
    pub is_active: bool,
    /// Soft-deleted queues are invisible to the engine.
    pub is_deleted: bool,
}

impl Queue {
    /// Whether the queue takes part in admission and release.
    pub const fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// Lifecycle state of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantState {
    /// Admitted and waiting for release.
    Waiting,
    /// Released by the scheduler.
    Ready,
    /// Admission window elapsed before release.
    Expired,
    /// Cancelled or refused.
    Rejected,
}

impl ParticipantState {
    /// Terminal states never change.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting)
    }

    /// Wire name of the state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end user's position within a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Store-assigned identifier.
    pub id: ParticipantId,
    /// Queue the participant joined.
    pub queue_id: Uuid,
    /// Caller-supplied visitor identifier.
    pub visitor_id: String,
    /// Bearer token for status checks and cancellation.
    pub token: String,
    /// Current lifecycle state.
    pub state: ParticipantState,
    /// Admission time, ms since epoch.
    pub created_at_ms: u128,
    /// End of the admission window, ms since epoch.
    pub expires_at_ms: u128,
    /// Time spent waiting, set once on release.
    pub wait_ms: Option<u128>,
    /// Opaque redirect hint forwarded to the callback.
    pub redirect_url: Option<String>,
    /// Excluded from lookups once cancelled.
    pub is_deleted: bool,
}

impl Participant {
    /// Wait duration in whole seconds, as sent on the wire.
    pub fn wait_secs(&self) -> Option<u64> {
        self.wait_ms
            .map(|ms| u64::try_from(ms / 1_000).unwrap_or(u64::MAX))
    }
}

/// Unpersisted participant handed to [`crate::core::ParticipantStore::insert`].
#[derive(Debug, Clone)]
pub struct NewParticipant {
    /// Queue the participant joins.
    pub queue_id: Uuid,
    /// Caller-supplied visitor identifier.
    pub visitor_id: String,
    /// Freshly generated token.
    pub token: String,
    /// Admission time, ms since epoch.
    pub created_at_ms: u128,
    /// End of the admission window, ms since epoch.
    pub expires_at_ms: u128,
    /// Optional redirect hint.
    pub redirect_url: Option<String>,
}

/// Conditional state change applied only to a waiting participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// waiting -> ready, recording the wait duration.
    Release {
        /// Milliseconds between admission and release.
        wait_ms: u128,
    },
    /// waiting -> expired.
    Expire,
    /// waiting -> rejected, and soft-delete.
    Cancel,
}

impl Transition {
    /// State the participant ends in.
    pub const fn target(self) -> ParticipantState {
        match self {
            Self::Release { .. } => ParticipantState::Ready,
            Self::Expire => ParticipantState::Expired,
            Self::Cancel => ParticipantState::Rejected,
        }
    }
}
