//! Tests for engine error types

use waitroom::core::EngineError;

#[test]
fn test_error_display() {
    assert_eq!(EngineError::InvalidCredential.to_string(), "invalid credential");
    assert_eq!(EngineError::QueueNotFound.to_string(), "queue not found");
    assert_eq!(EngineError::TokenNotFound.to_string(), "token not found");
    assert_eq!(
        EngineError::RateLimited { remaining: 0 }.to_string(),
        "rate limit exceeded (0 remaining)"
    );
    assert_eq!(
        EngineError::DeliveryFailure("endpoint returned 503".into()).to_string(),
        "callback delivery failed: endpoint returned 503"
    );
    assert_eq!(
        EngineError::Backend("disk full".into()).to_string(),
        "backend error: disk full"
    );
}

#[test]
fn test_error_status_codes() {
    assert_eq!(EngineError::InvalidCredential.status_code(), 401);
    assert_eq!(EngineError::QueueNotFound.status_code(), 404);
    assert_eq!(EngineError::TokenNotFound.status_code(), 404);
    assert_eq!(EngineError::RateLimited { remaining: 3 }.status_code(), 429);
    assert_eq!(EngineError::DuplicateToken.status_code(), 500);
    assert_eq!(EngineError::StoreConflict.status_code(), 409);
    assert_eq!(EngineError::DeliveryFailure(String::new()).status_code(), 502);
    assert_eq!(EngineError::Backend(String::new()).status_code(), 500);
}

#[test]
fn test_error_into_anyhow() {
    let err: anyhow::Error = EngineError::QueueNotFound.into();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::QueueNotFound)
    );
}
