//! Delivery failure log.
//!
//! Records are appended only when a callback exhausts its retries and are
//! never updated afterwards.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::ParticipantId;
use crate::util::clock::now_ms;

/// Event classification for callbacks that exhausted their retries.
pub const CALLBACK_FAILURE_EVENT: &str = "callback_failure";

/// One terminal callback failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAttemptRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Event classification.
    pub event_type: String,
    /// Short summary.
    pub message: String,
    /// Free-text diagnostic detail.
    pub details: String,
    /// Owning application.
    pub application_id: Uuid,
    /// Queue the participant was released from.
    pub queue_id: Uuid,
    /// Participant whose callback failed.
    pub participant_id: ParticipantId,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Append-only sink for delivery failures.
pub trait DeliveryLog: Send + Sync + 'static {
    /// Append a record.
    fn record(&self, record: DeliveryAttemptRecord);
}

/// In-memory delivery log with a bounded buffer.
pub struct InMemoryDeliveryLog {
    records: Mutex<VecDeque<DeliveryAttemptRecord>>,
    max_records: usize,
}

impl InMemoryDeliveryLog {
    /// Create a new in-memory log keeping at most `max_records`.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records,
        }
    }

    /// Snapshot of stored records, oldest first.
    pub fn records(&self) -> Vec<DeliveryAttemptRecord> {
        self.records.lock().iter().cloned().collect()
    }
}

impl DeliveryLog for InMemoryDeliveryLog {
    fn record(&self, record: DeliveryAttemptRecord) {
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record);
    }
}

/// Build a callback failure record for a participant.
pub fn build_delivery_record(
    application_id: Uuid,
    queue_id: Uuid,
    participant_id: ParticipantId,
    attempts: u32,
    details: impl Into<String>,
) -> DeliveryAttemptRecord {
    DeliveryAttemptRecord {
        id: Uuid::new_v4(),
        event_type: CALLBACK_FAILURE_EVENT.to_string(),
        message: format!("Callback failed after {attempts} attempts"),
        details: details.into(),
        application_id,
        queue_id,
        participant_id,
        created_at_ms: now_ms(),
    }
}
