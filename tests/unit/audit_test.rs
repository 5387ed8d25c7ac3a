//! Tests for the delivery failure log

use uuid::Uuid;
use waitroom::core::{
    build_delivery_record, DeliveryLog, InMemoryDeliveryLog, CALLBACK_FAILURE_EVENT,
};

#[test]
fn test_delivery_record_fields() {
    let app = Uuid::new_v4();
    let queue = Uuid::new_v4();
    let record = build_delivery_record(app, queue, 42, 3, "connection refused");

    assert_eq!(record.event_type, CALLBACK_FAILURE_EVENT);
    assert_eq!(record.message, "Callback failed after 3 attempts");
    assert_eq!(record.details, "connection refused");
    assert_eq!(record.application_id, app);
    assert_eq!(record.queue_id, queue);
    assert_eq!(record.participant_id, 42);
    assert!(record.created_at_ms > 0);
}

#[test]
fn test_in_memory_log_is_bounded() {
    let log = InMemoryDeliveryLog::new(2);
    let app = Uuid::new_v4();
    let queue = Uuid::new_v4();
    for pid in 1..=3 {
        log.record(build_delivery_record(app, queue, pid, 3, "boom"));
    }

    let records = log.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].participant_id, 2);
    assert_eq!(records[1].participant_id, 3);
}

#[test]
fn test_delivery_record_serializes() {
    let record = build_delivery_record(Uuid::new_v4(), Uuid::new_v4(), 7, 3, "timeout");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["event_type"], "callback_failure");
    assert_eq!(json["participant_id"], 7);
}
